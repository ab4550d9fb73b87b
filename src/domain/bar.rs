//! OHLC(V) bar representation and time-ordered bar series.

use chrono::{DateTime, Utc};
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// low <= {open, close} <= high
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high
    }
}

/// Bars for one instrument at one interval, strictly increasing by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Sorts by timestamp and drops duplicate timestamps, keeping the first
    /// occurrence in input order.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    pub fn into_inner(self) -> Vec<Bar> {
        self.bars
    }
}

impl Deref for BarSeries {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}

/// True when timestamps are strictly increasing.
pub fn is_strictly_ordered(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    fn sample_bar(hour: u32, close: f64) -> Bar {
        Bar::new(at(hour), 100.0, 110.0, 90.0, close, Some(50_000.0))
    }

    #[test]
    fn well_formed_bar() {
        assert!(sample_bar(0, 105.0).is_well_formed());
    }

    #[test]
    fn close_above_high_is_malformed() {
        assert!(!sample_bar(0, 111.0).is_well_formed());
    }

    #[test]
    fn open_below_low_is_malformed() {
        let bar = Bar::new(at(0), 89.0, 110.0, 90.0, 100.0, None);
        assert!(!bar.is_well_formed());
    }

    #[test]
    fn series_sorts_and_dedups() {
        let series = BarSeries::new(vec![
            sample_bar(2, 102.0),
            sample_bar(0, 100.0),
            sample_bar(2, 999.0),
            sample_bar(1, 101.0),
        ]);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].timestamp, at(0));
        assert_eq!(series[2].timestamp, at(2));
        // first occurrence of the duplicate survives
        assert_eq!(series[2].close, 102.0);
        assert!(is_strictly_ordered(&series));
    }

    #[test]
    fn unordered_slice_detected() {
        let bars = vec![sample_bar(1, 100.0), sample_bar(0, 100.0)];
        assert!(!is_strictly_ordered(&bars));
    }
}
