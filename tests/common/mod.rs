#![allow(dead_code)]

use candlescan::domain::error::ScanError;
use candlescan::domain::timeframe::BaseInterval;
use candlescan::ports::data_port::DataPort;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub use candlescan::domain::bar::Bar;

pub struct MockDataPort {
    pub data: HashMap<(String, BaseInterval), Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub calls: Mutex<Vec<(String, BaseInterval)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, interval: BaseInterval, bars: Vec<Bar>) -> Self {
        self.data.insert((ticker.to_string(), interval), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        interval: BaseInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ScanError> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), interval));
        if let Some(reason) = self.errors.get(ticker) {
            return Err(ScanError::unavailable(ticker, reason.clone()));
        }
        Ok(self
            .data
            .get(&(ticker.to_string(), interval))
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.timestamp >= start && b.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_instruments(&self, interval: BaseInterval) -> Result<Vec<String>, ScanError> {
        let mut tickers: Vec<String> = self
            .data
            .keys()
            .filter(|(_, i)| *i == interval)
            .map(|(t, _)| t.clone())
            .collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn bar(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(timestamp, open, high, low, close, Some(1000.0))
}

/// Repeating four-bar cycle: base bar, Filter1 match, Filter2 match, quiet
/// bar. Each cycle is shifted slightly so consecutive cycles differ.
pub fn generate_bars(start: DateTime<Utc>, step: Duration, count: usize) -> Vec<Bar> {
    const CYCLE: [(f64, f64, f64, f64); 4] = [
        (1.10, 1.12, 1.09, 1.11),
        (1.105, 1.125, 1.095, 1.08),
        (1.09, 1.10, 1.09, 1.10),
        (1.09, 1.095, 1.08, 1.09),
    ];
    (0..count)
        .map(|i| {
            let shift = ((i / 4) % 5) as f64 * 0.001;
            let (open, high, low, close) = CYCLE[i % 4];
            bar(
                start + step * i as i32,
                open + shift,
                high + shift,
                low + shift,
                close + shift,
            )
        })
        .collect()
}
