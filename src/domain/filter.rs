//! Two-bar price-action filters.
//!
//! Comparisons are exact `f64` comparisons with no tolerance, so results are
//! sensitive to how the supplier rounds prices.

use crate::domain::bar::Bar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
    /// Bearish failed breakout above the previous high.
    Filter1,
    /// Bullish failed breakdown below the previous low.
    Filter2,
}

impl FilterKind {
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Filter1 => "Filter 1",
            FilterKind::Filter2 => "Filter 2",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

pub fn is_filter1(previous: &Bar, current: &Bar) -> bool {
    current.open < previous.high && current.close < previous.close && current.high > previous.high
}

pub fn is_filter2(previous: &Bar, current: &Bar) -> bool {
    current.close > previous.low && current.low < previous.low && current.high < previous.high
}

/// Filter1 is checked first; the first match wins.
pub fn evaluate(previous: &Bar, current: &Bar) -> Option<FilterKind> {
    if is_filter1(previous, current) {
        Some(FilterKind::Filter1)
    } else if is_filter2(previous, current) {
        Some(FilterKind::Filter2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            None,
        )
    }

    #[test]
    fn bearish_failed_breakout_is_filter1() {
        let prev = bar(1.10, 1.12, 1.09, 1.11);
        let curr = bar(1.105, 1.125, 1.095, 1.08);
        assert_eq!(evaluate(&prev, &curr), Some(FilterKind::Filter1));
    }

    #[test]
    fn bullish_failed_breakdown_is_filter2() {
        let prev = bar(1.10, 1.12, 1.09, 1.11);
        let curr = bar(1.09, 1.10, 1.085, 1.095);
        assert_eq!(evaluate(&prev, &curr), Some(FilterKind::Filter2));
    }

    #[test]
    fn inside_bar_matches_nothing() {
        let prev = bar(1.10, 1.12, 1.09, 1.11);
        let curr = bar(1.10, 1.11, 1.095, 1.105);
        assert_eq!(evaluate(&prev, &curr), None);
    }

    #[test]
    fn equal_high_is_not_a_breakout() {
        let prev = bar(1.10, 1.12, 1.09, 1.11);
        let curr = bar(1.105, 1.12, 1.095, 1.08);
        assert!(!is_filter1(&prev, &curr));
    }

    #[test]
    fn filter1_takes_priority() {
        let prev = bar(10.0, 12.0, 9.0, 11.0);
        let curr = bar(10.0, 13.0, 8.0, 10.0);
        assert!(is_filter1(&prev, &curr));
        assert_eq!(evaluate(&prev, &curr), Some(FilterKind::Filter1));
    }

    #[test]
    fn nan_prices_match_nothing() {
        let prev = bar(1.10, 1.12, 1.09, 1.11);
        let curr = bar(f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        assert_eq!(evaluate(&prev, &curr), None);
    }

    #[test]
    fn malformed_bars_are_evaluated_literally() {
        let prev = bar(1.10, 1.12, 1.09, 1.11);
        // close above high, still compared as given
        let curr = bar(1.09, 1.10, 1.085, 1.15);
        assert!(!curr.is_well_formed());
        assert_eq!(evaluate(&prev, &curr), Some(FilterKind::Filter2));
    }

    #[test]
    fn labels() {
        assert_eq!(FilterKind::Filter1.to_string(), "Filter 1");
        assert_eq!(FilterKind::Filter2.to_string(), "Filter 2");
    }
}
