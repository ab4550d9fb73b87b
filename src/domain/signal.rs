//! Signal records and the views the presentation layer draws from them.

use crate::domain::bar::Bar;
use crate::domain::filter::FilterKind;
use crate::domain::timeframe::Timeframe;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub instrument: String,
    pub timeframe: Timeframe,
    pub timestamp: DateTime<Utc>,
    pub filter_kind: FilterKind,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl SignalRecord {
    /// Record for a match on `bar`, the current bar of the evaluated pair.
    pub fn from_bar(instrument: &str, timeframe: Timeframe, kind: FilterKind, bar: &Bar) -> Self {
        Self {
            instrument: instrument.to_string(),
            timeframe,
            timestamp: bar.timestamp,
            filter_kind: kind,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub kind: FilterKind,
    pub count: usize,
}

/// Signal counts per (UTC day, filter kind), ascending by date then kind.
pub fn summarize_by_day(signals: &[SignalRecord]) -> Vec<DailyCount> {
    let mut counts: BTreeMap<(NaiveDate, FilterKind), usize> = BTreeMap::new();
    for signal in signals {
        *counts.entry((signal.date(), signal.filter_kind)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((date, kind), count)| DailyCount { date, kind, count })
        .collect()
}

/// Newest first, ties broken by instrument then timeframe, at most `limit`.
pub fn latest_signals(signals: &[SignalRecord], limit: usize) -> Vec<&SignalRecord> {
    let mut sorted: Vec<&SignalRecord> = signals.iter().collect();
    sorted.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.instrument.cmp(&b.instrument))
            .then_with(|| a.timeframe.cmp(&b.timeframe))
    });
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signal(instrument: &str, day: u32, hour: u32, kind: FilterKind) -> SignalRecord {
        let bar = Bar::new(
            Utc.with_ymd_and_hms(2024, 2, day, hour, 0, 0).unwrap(),
            1.0,
            2.0,
            0.5,
            1.5,
            None,
        );
        SignalRecord::from_bar(instrument, Timeframe::Hour4, kind, &bar)
    }

    #[test]
    fn from_bar_copies_prices() {
        let s = signal("GC=F", 3, 8, FilterKind::Filter2);
        assert_eq!(s.instrument, "GC=F");
        assert_eq!(s.timeframe, Timeframe::Hour4);
        assert_eq!(s.filter_kind, FilterKind::Filter2);
        assert_eq!((s.open, s.high, s.low, s.close), (1.0, 2.0, 0.5, 1.5));
    }

    #[test]
    fn summary_groups_by_day_and_kind() {
        let signals = vec![
            signal("EURUSD=X", 5, 4, FilterKind::Filter2),
            signal("GBPUSD=X", 3, 0, FilterKind::Filter1),
            signal("EURUSD=X", 3, 12, FilterKind::Filter1),
            signal("^GSPC", 3, 16, FilterKind::Filter2),
        ];
        let summary = summarize_by_day(&signals);

        let d = |day| NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        assert_eq!(
            summary,
            vec![
                DailyCount { date: d(3), kind: FilterKind::Filter1, count: 2 },
                DailyCount { date: d(3), kind: FilterKind::Filter2, count: 1 },
                DailyCount { date: d(5), kind: FilterKind::Filter2, count: 1 },
            ]
        );
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert!(summarize_by_day(&[]).is_empty());
    }

    #[test]
    fn latest_is_newest_first_and_limited() {
        let signals = vec![
            signal("B", 1, 0, FilterKind::Filter1),
            signal("A", 4, 0, FilterKind::Filter1),
            signal("C", 2, 0, FilterKind::Filter2),
            signal("B", 4, 0, FilterKind::Filter2),
        ];
        let latest = latest_signals(&signals, 3);

        assert_eq!(latest.len(), 3);
        assert_eq!(latest[0].instrument, "A");
        assert_eq!(latest[1].instrument, "B");
        assert_eq!(latest[2].instrument, "C");
    }
}
