//! Bar supplier port.

use crate::domain::bar::Bar;
use crate::domain::error::ScanError;
use crate::domain::timeframe::BaseInterval;
use chrono::{DateTime, Utc};

/// Supplier of time-ordered OHLC bars.
///
/// Implementations may return bars out of order or with duplicate
/// timestamps; the scanner normalises them. Any failure, including a
/// timeout, is reported as [`ScanError::DataUnavailable`].
pub trait DataPort: Send + Sync {
    fn fetch_bars(
        &self,
        ticker: &str,
        interval: BaseInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ScanError>;

    fn list_instruments(&self, interval: BaseInterval) -> Result<Vec<String>, ScanError>;
}
