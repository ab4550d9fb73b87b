//! Timeframe catalog: scanned candle durations and the supplier intervals
//! they are built from.

use crate::domain::error::ScanError;
use chrono::Duration;
use std::fmt;
use std::str::FromStr;

/// Sampling interval requested from the data supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseInterval {
    Hour1,
    Day1,
    Week1,
    Month1,
}

impl BaseInterval {
    pub fn label(&self) -> &'static str {
        match self {
            BaseInterval::Hour1 => "1h",
            BaseInterval::Day1 => "1d",
            BaseInterval::Week1 => "1wk",
            BaseInterval::Month1 => "1mo",
        }
    }

    pub fn all() -> &'static [BaseInterval] {
        &[
            BaseInterval::Hour1,
            BaseInterval::Day1,
            BaseInterval::Week1,
            BaseInterval::Month1,
        ]
    }
}

impl fmt::Display for BaseInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for BaseInterval {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseInterval::all()
            .iter()
            .copied()
            .find(|i| i.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ScanError::invalid("interval", format!("unknown interval '{}'", s.trim()))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    Hour1,
    Hour4,
    Day1,
    Week1,
    Month1,
}

impl Timeframe {
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1H",
            Timeframe::Hour4 => "4H",
            Timeframe::Day1 => "1D",
            Timeframe::Week1 => "1W",
            Timeframe::Month1 => "1M",
        }
    }

    pub fn base_interval(&self) -> BaseInterval {
        match self {
            Timeframe::Hour1 | Timeframe::Hour4 => BaseInterval::Hour1,
            Timeframe::Day1 => BaseInterval::Day1,
            Timeframe::Week1 => BaseInterval::Week1,
            Timeframe::Month1 => BaseInterval::Month1,
        }
    }

    /// Bucket width when the supplier interval is finer than the timeframe.
    pub fn aggregation_window(&self) -> Option<Duration> {
        match self {
            Timeframe::Hour4 => Some(Duration::hours(4)),
            _ => None,
        }
    }

    pub fn default_lookback(&self) -> Duration {
        match self {
            Timeframe::Hour1 => Duration::days(30),
            Timeframe::Hour4 => Duration::days(60),
            Timeframe::Day1 | Timeframe::Week1 | Timeframe::Month1 => Duration::days(5 * 365),
        }
    }

    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Hour1,
            Timeframe::Hour4,
            Timeframe::Day1,
            Timeframe::Week1,
            Timeframe::Month1,
        ]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        // "1m" reads as one minute elsewhere
        if raw == "1m" {
            return Err(ScanError::invalid(
                "timeframe",
                "'1m' is ambiguous, use 1M or monthly",
            ));
        }
        match raw.to_ascii_lowercase().as_str() {
            "1h" | "hourly" => Ok(Timeframe::Hour1),
            "4h" => Ok(Timeframe::Hour4),
            "1d" | "daily" => Ok(Timeframe::Day1),
            "1w" | "1wk" | "weekly" => Ok(Timeframe::Week1),
            "1m" | "1mo" | "monthly" => Ok(Timeframe::Month1),
            _ => Err(ScanError::invalid(
                "timeframe",
                format!("unknown timeframe '{}'", raw),
            )),
        }
    }
}

/// Parses a comma-separated timeframe list, dropping repeats.
pub fn parse_timeframes(input: &str) -> Result<Vec<Timeframe>, ScanError> {
    let mut out: Vec<Timeframe> = Vec::new();
    for token in input.split(',') {
        if token.trim().is_empty() {
            return Err(ScanError::invalid("timeframe", "empty token in timeframe list"));
        }
        let tf: Timeframe = token.parse()?;
        if !out.contains(&tf) {
            out.push(tf);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_four_hour_aggregates() {
        for tf in Timeframe::all() {
            assert_eq!(
                tf.aggregation_window().is_some(),
                *tf == Timeframe::Hour4,
                "{tf}"
            );
        }
        assert_eq!(
            Timeframe::Hour4.aggregation_window(),
            Some(Duration::hours(4))
        );
    }

    #[test]
    fn base_intervals() {
        assert_eq!(Timeframe::Hour1.base_interval(), BaseInterval::Hour1);
        assert_eq!(Timeframe::Hour4.base_interval(), BaseInterval::Hour1);
        assert_eq!(Timeframe::Day1.base_interval(), BaseInterval::Day1);
        assert_eq!(Timeframe::Week1.base_interval(), BaseInterval::Week1);
        assert_eq!(Timeframe::Month1.base_interval(), BaseInterval::Month1);
    }

    #[test]
    fn parse_labels_and_aliases() {
        assert_eq!("4H".parse::<Timeframe>().unwrap(), Timeframe::Hour4);
        assert_eq!("4h".parse::<Timeframe>().unwrap(), Timeframe::Hour4);
        assert_eq!(" daily ".parse::<Timeframe>().unwrap(), Timeframe::Day1);
        assert_eq!("1wk".parse::<Timeframe>().unwrap(), Timeframe::Week1);
        assert_eq!("1M".parse::<Timeframe>().unwrap(), Timeframe::Month1);
        assert_eq!("Monthly".parse::<Timeframe>().unwrap(), Timeframe::Month1);
    }

    #[test]
    fn lowercase_one_m_is_rejected() {
        let err = "1m".parse::<Timeframe>().unwrap_err();
        assert!(matches!(err, ScanError::InvalidParameter { .. }));
    }

    #[test]
    fn unknown_timeframe_is_rejected() {
        assert!("15m".parse::<Timeframe>().is_err());
    }

    #[test]
    fn label_round_trips() {
        for tf in Timeframe::all() {
            assert_eq!(tf.label().parse::<Timeframe>().unwrap(), *tf);
        }
        for iv in BaseInterval::all() {
            assert_eq!(iv.label().parse::<BaseInterval>().unwrap(), *iv);
        }
    }

    #[test]
    fn parse_list_dedups_and_keeps_order() {
        let tfs = parse_timeframes("1W, 1D,1w").unwrap();
        assert_eq!(tfs, vec![Timeframe::Week1, Timeframe::Day1]);
    }

    #[test]
    fn parse_list_rejects_empty_token() {
        assert!(parse_timeframes("1D,,1W").is_err());
    }
}
