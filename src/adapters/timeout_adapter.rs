//! Per-request timeout decorator for any [`DataPort`].
//!
//! Each fetch runs on its own thread; the caller waits at most `timeout`.
//! A request that overruns is reported as no data, and its thread is left to
//! finish in the background with the result discarded.

use crate::domain::bar::Bar;
use crate::domain::error::ScanError;
use crate::domain::timeframe::BaseInterval;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct TimeoutDataPort {
    inner: Arc<dyn DataPort>,
    timeout: Duration,
}

impl TimeoutDataPort {
    pub fn new(inner: Arc<dyn DataPort>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl DataPort for TimeoutDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        interval: BaseInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, ScanError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned_ticker = ticker.to_string();

        thread::Builder::new()
            .name(format!("fetch-{}", ticker))
            .spawn(move || {
                // receiver may be gone after a timeout
                let _ = tx.send(inner.fetch_bars(&owned_ticker, interval, start, end));
            })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(ScanError::unavailable(
                ticker,
                format!("timed out after {:?}", self.timeout),
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ScanError::unavailable(
                ticker,
                "supplier thread exited without a result",
            )),
        }
    }

    fn list_instruments(&self, interval: BaseInterval) -> Result<Vec<String>, ScanError> {
        self.inner.list_instruments(interval)
    }
}
