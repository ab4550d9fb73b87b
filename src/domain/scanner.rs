//! Scan engine: fetch, aggregate and evaluate filters per
//! (instrument, timeframe) unit.
//!
//! Live and backtest scans share [`evaluate_series`], so a bar pair yields
//! the same signal whichever mode reaches it. The backtest walk only ever
//! looks at `(bars[i - 1], bars[i])` when emitting the signal for bar `i`.

use crate::domain::aggregator::aggregate;
use crate::domain::bar::{Bar, BarSeries};
use crate::domain::error::ScanError;
use crate::domain::filter::evaluate;
use crate::domain::signal::{latest_signals, summarize_by_day, DailyCount, SignalRecord};
use crate::domain::timeframe::Timeframe;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fewest bars that form one evaluable pair.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Evaluate only the most recent bar pair.
    Live,
    /// Walk every adjacent bar pair in chronological order.
    Backtest,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScanMode::Live => "live",
            ScanMode::Backtest => "backtest",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub instrument: String,
    pub timeframe: Timeframe,
    pub mode: ScanMode,
    pub lookback: Duration,
}

impl ScanRequest {
    pub fn new(instrument: &str, timeframe: Timeframe, mode: ScanMode, lookback: Duration) -> Self {
        Self {
            instrument: instrument.to_string(),
            timeframe,
            mode,
            lookback,
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.instrument.trim().is_empty() {
            return Err(ScanError::invalid("instrument", "must not be empty"));
        }
        if self.lookback <= Duration::zero() {
            return Err(ScanError::invalid(
                "lookback",
                format!("must be a positive duration, got {}", self.lookback),
            ));
        }
        Ok(())
    }

    /// Fetch window `[now - lookback, now]`.
    pub fn window(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), ScanError> {
        let start = now.checked_sub_signed(self.lookback).ok_or_else(|| {
            ScanError::invalid("lookback", "reaches before the representable range")
        })?;
        Ok((start, now))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnitStatus {
    Completed { bars: usize },
    InsufficientHistory { bars: usize },
    DataUnavailable { reason: String },
    Cancelled,
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Completed { bars } => write!(f, "ok ({} bars)", bars),
            UnitStatus::InsufficientHistory { bars } => {
                write!(f, "insufficient history ({} bars)", bars)
            }
            UnitStatus::DataUnavailable { reason } => write!(f, "data unavailable: {}", reason),
            UnitStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub signals: Vec<SignalRecord>,
    pub status: UnitStatus,
}

impl ScanOutcome {
    fn empty(status: UnitStatus) -> Self {
        Self {
            signals: Vec::new(),
            status,
        }
    }
}

/// Signal for the final pair of `bars`, if it matches.
pub fn live_signal(instrument: &str, timeframe: Timeframe, bars: &[Bar]) -> Option<SignalRecord> {
    match bars {
        [.., previous, current] => evaluate(previous, current)
            .map(|kind| SignalRecord::from_bar(instrument, timeframe, kind, current)),
        _ => None,
    }
}

/// One signal per matching adjacent pair, in chronological order.
pub fn backtest_signals(instrument: &str, timeframe: Timeframe, bars: &[Bar]) -> Vec<SignalRecord> {
    bars.windows(2)
        .filter_map(|pair| {
            evaluate(&pair[0], &pair[1])
                .map(|kind| SignalRecord::from_bar(instrument, timeframe, kind, &pair[1]))
        })
        .collect()
}

/// Normalises, aggregates when the timeframe needs it, and evaluates.
pub fn evaluate_series(
    instrument: &str,
    timeframe: Timeframe,
    mode: ScanMode,
    bars: Vec<Bar>,
) -> Result<ScanOutcome, ScanError> {
    let mut series = BarSeries::new(bars);
    if series.len() < MIN_BARS {
        return Ok(ScanOutcome::empty(UnitStatus::InsufficientHistory {
            bars: series.len(),
        }));
    }

    if let Some(window) = timeframe.aggregation_window() {
        series = aggregate(&series, window)?;
        if series.len() < MIN_BARS {
            return Ok(ScanOutcome::empty(UnitStatus::InsufficientHistory {
                bars: series.len(),
            }));
        }
    }

    let malformed = series.iter().filter(|b| !b.is_well_formed()).count();
    if malformed > 0 {
        debug!(
            "{} {}: {} of {} bars violate low <= open/close <= high",
            instrument,
            timeframe,
            malformed,
            series.len()
        );
    }

    let signals = match mode {
        ScanMode::Live => live_signal(instrument, timeframe, &series).into_iter().collect(),
        ScanMode::Backtest => backtest_signals(instrument, timeframe, &series),
    };

    Ok(ScanOutcome {
        signals,
        status: UnitStatus::Completed { bars: series.len() },
    })
}

/// Scans one unit over `[now - lookback, now]`.
///
/// Only parameter errors are returned as `Err`; supplier and evaluation
/// failures become [`UnitStatus::DataUnavailable`].
pub fn scan(
    port: &dyn DataPort,
    request: &ScanRequest,
    now: DateTime<Utc>,
) -> Result<ScanOutcome, ScanError> {
    request.validate()?;
    let (start, end) = request.window(now)?;

    let interval = request.timeframe.base_interval();
    let bars = match port.fetch_bars(&request.instrument, interval, start, end) {
        Ok(bars) => bars,
        Err(e) => {
            warn!(
                "skipping {} {}: {}",
                request.instrument, request.timeframe, e
            );
            return Ok(ScanOutcome::empty(UnitStatus::DataUnavailable {
                reason: e.to_string(),
            }));
        }
    };

    if bars.is_empty() {
        warn!(
            "skipping {} {}: no bars returned",
            request.instrument, request.timeframe
        );
        return Ok(ScanOutcome::empty(UnitStatus::DataUnavailable {
            reason: "no bars returned".to_string(),
        }));
    }

    let outcome = match evaluate_series(&request.instrument, request.timeframe, request.mode, bars)
    {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(
                "skipping {} {}: evaluation failed: {}",
                request.instrument, request.timeframe, e
            );
            return Ok(ScanOutcome::empty(UnitStatus::DataUnavailable {
                reason: format!("evaluation failed: {}", e),
            }));
        }
    };
    debug!(
        "{} {} {}: {}, {} signals",
        request.instrument,
        request.timeframe,
        request.mode,
        outcome.status,
        outcome.signals.len()
    );
    Ok(outcome)
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitReport {
    pub instrument: String,
    pub timeframe: Timeframe,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Ordered by (timestamp, instrument, timeframe).
    pub signals: Vec<SignalRecord>,
    /// One entry per (instrument, timeframe), in request order.
    pub units: Vec<UnitReport>,
}

impl ScanReport {
    pub fn failures(&self) -> Vec<&UnitReport> {
        self.units
            .iter()
            .filter(|u| matches!(u.status, UnitStatus::DataUnavailable { .. }))
            .collect()
    }

    pub fn completed(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.status, UnitStatus::Completed { .. }))
            .count()
    }

    pub fn summary(&self) -> Vec<DailyCount> {
        summarize_by_day(&self.signals)
    }

    pub fn latest(&self, limit: usize) -> Vec<&SignalRecord> {
        latest_signals(&self.signals, limit)
    }
}

/// Runs the (instrument x timeframe) cross product on a bounded worker pool.
pub struct ScanEngine<'a> {
    port: &'a dyn DataPort,
    max_concurrency: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> ScanEngine<'a> {
    pub fn new(port: &'a dyn DataPort, max_concurrency: usize) -> Result<Self, ScanError> {
        if max_concurrency == 0 {
            return Err(ScanError::invalid("max_concurrency", "must be at least 1"));
        }
        Ok(Self {
            port,
            max_concurrency,
            cancel: None,
        })
    }

    /// Units that have not fetched yet when `flag` is set report `Cancelled`.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// `lookback` of `None` uses each timeframe's default.
    pub fn run(
        &self,
        instruments: &[String],
        timeframes: &[Timeframe],
        mode: ScanMode,
        lookback: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<ScanReport, ScanError> {
        let requests: Vec<ScanRequest> = instruments
            .iter()
            .flat_map(|instrument| {
                timeframes.iter().map(move |tf| {
                    ScanRequest::new(
                        instrument,
                        *tf,
                        mode,
                        lookback.unwrap_or_else(|| tf.default_lookback()),
                    )
                })
            })
            .collect();

        for request in &requests {
            request.validate()?;
            request.window(now)?;
        }

        info!(
            "scanning {} instruments x {} timeframes ({} mode, {} workers)",
            instruments.len(),
            timeframes.len(),
            mode,
            self.max_concurrency
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_concurrency)
            .build()
            .map_err(|e| ScanError::Io(std::io::Error::other(e)))?;

        let outcomes: Vec<Result<ScanOutcome, ScanError>> = pool.install(|| {
            requests
                .par_iter()
                .map(|request| {
                    if self.is_cancelled() {
                        return Ok(ScanOutcome::empty(UnitStatus::Cancelled));
                    }
                    scan(self.port, request, now)
                })
                .collect()
        });

        let mut report = ScanReport::default();
        for (request, outcome) in requests.into_iter().zip(outcomes) {
            let outcome = outcome?;
            report.signals.extend(outcome.signals);
            report.units.push(UnitReport {
                instrument: request.instrument,
                timeframe: request.timeframe,
                status: outcome.status,
            });
        }

        report.signals.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.instrument.cmp(&b.instrument))
                .then_with(|| a.timeframe.cmp(&b.timeframe))
        });

        info!(
            "scan finished: {} signals, {} of {} units completed, {} unavailable",
            report.signals.len(),
            report.completed(),
            report.units.len(),
            report.failures().len()
        );
        Ok(report)
    }
}
