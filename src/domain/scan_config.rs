//! Resolved scan settings.

use crate::domain::timeframe::Timeframe;
use chrono::Duration;
use std::path::PathBuf;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub data_path: PathBuf,
    pub timeout: std::time::Duration,
    pub timeframes: Vec<Timeframe>,
    /// `None` means each timeframe's default lookback.
    pub lookback: Option<Duration>,
    pub max_concurrency: usize,
}

impl ScanConfig {
    pub fn default_timeframes() -> Vec<Timeframe> {
        vec![Timeframe::Day1, Timeframe::Week1, Timeframe::Month1]
    }
}
