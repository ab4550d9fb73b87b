//! CSV report adapter implementing ReportPort.
//!
//! Writes `signals.csv` with every signal and, for backtests, `summary.csv`
//! with per-day counts by filter kind for charting.

use crate::domain::error::ScanError;
use crate::domain::scanner::{ScanMode, ScanReport};
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub const SIGNALS_FILE: &str = "signals.csv";
pub const SUMMARY_FILE: &str = "summary.csv";

pub struct CsvReportAdapter;

fn csv_error(e: csv::Error) -> ScanError {
    ScanError::Io(std::io::Error::other(e))
}

impl CsvReportAdapter {
    fn write_signals(report: &ScanReport, path: &Path) -> Result<(), ScanError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record([
            "instrument",
            "timeframe",
            "timestamp",
            "filter",
            "open",
            "high",
            "low",
            "close",
        ])
        .map_err(csv_error)?;

        for s in &report.signals {
            wtr.write_record([
                s.instrument.clone(),
                s.timeframe.to_string(),
                s.timestamp.to_rfc3339(),
                s.filter_kind.to_string(),
                s.open.to_string(),
                s.high.to_string(),
                s.low.to_string(),
                s.close.to_string(),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_summary(report: &ScanReport, path: &Path) -> Result<(), ScanError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record(["date", "filter", "count"]).map_err(csv_error)?;
        for row in report.summary() {
            wtr.write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.kind.to_string(),
                row.count.to_string(),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &ScanReport,
        mode: ScanMode,
        output_dir: &Path,
    ) -> Result<(), ScanError> {
        fs::create_dir_all(output_dir)?;
        Self::write_signals(report, &output_dir.join(SIGNALS_FILE))?;
        if mode == ScanMode::Backtest {
            Self::write_summary(report, &output_dir.join(SUMMARY_FILE))?;
        }
        Ok(())
    }
}
