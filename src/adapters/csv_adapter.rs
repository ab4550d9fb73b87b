//! CSV file data adapter.
//!
//! One file per ticker and interval, `{ticker}_{interval}.csv`, with columns
//! `timestamp,open,high,low,close[,volume]`.

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::error::ScanError;
use crate::domain::timeframe::BaseInterval;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, interval: BaseInterval) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", ticker, interval.label()))
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD` (UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<f64, ScanError> {
    record
        .get(index)
        .ok_or_else(|| ScanError::unavailable(ticker, format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| ScanError::unavailable(ticker, format!("invalid {} value: {}", name, e)))
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        interval: BaseInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ScanError> {
        let path = self.csv_path(ticker, interval);
        let content = fs::read_to_string(&path).map_err(|e| {
            ScanError::unavailable(ticker, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| ScanError::unavailable(ticker, format!("CSV parse error: {}", e)))?;

            let ts_str = record
                .get(0)
                .ok_or_else(|| ScanError::unavailable(ticker, "missing timestamp column"))?;
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| {
                ScanError::unavailable(ticker, format!("invalid timestamp '{}'", ts_str))
            })?;

            if timestamp < start || timestamp > end {
                continue;
            }

            let volume = match record.get(5).map(str::trim) {
                None | Some("") => None,
                Some(_) => Some(parse_price(&record, 5, "volume", ticker)?),
            };

            bars.push(Bar::new(
                timestamp,
                parse_price(&record, 1, "open", ticker)?,
                parse_price(&record, 2, "high", ticker)?,
                parse_price(&record, 3, "low", ticker)?,
                parse_price(&record, 4, "close", ticker)?,
                volume,
            ));
        }

        Ok(BarSeries::new(bars).into_inner())
    }

    fn list_instruments(&self, interval: BaseInterval) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            ScanError::unavailable(
                "*",
                format!(
                    "failed to read directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            )
        })?;

        let suffix = format!("_{}.csv", interval.label());
        let mut tickers = Vec::new();

        for entry in entries {
            let entry = entry
                .map_err(|e| ScanError::unavailable("*", format!("directory entry error: {}", e)))?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(&suffix) {
                if !ticker.is_empty() {
                    tickers.push(ticker.to_string());
                }
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
