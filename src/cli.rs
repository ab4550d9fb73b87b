//! CLI definition and dispatch.

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::timeout_adapter::TimeoutDataPort;
use crate::domain::config_validation::{optional_int, validate_scan_config};
use crate::domain::error::ScanError;
use crate::domain::scan_config::{ScanConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS};
use crate::domain::scanner::{ScanEngine, ScanMode, ScanReport};
use crate::domain::signal::SignalRecord;
use crate::domain::timeframe::{parse_timeframes, BaseInterval, Timeframe};
use crate::domain::universe::{parse_codes, AssetClass, Universe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_LATEST: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "candlescan", about = "Multi-timeframe candle filter scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Timeframes to scan (1H, 4H, 1D, 1W, 1M); repeatable
    #[arg(short, long)]
    pub timeframe: Vec<String>,
    /// Restrict the scan to these tickers; repeatable
    #[arg(short, long)]
    pub instrument: Vec<String>,
    #[arg(long)]
    pub lookback_days: Option<i64>,
    /// Directory for the CSV report
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the latest bar pair of every instrument
    Scan {
        #[command(flatten)]
        args: ScanArgs,
    },
    /// Walk every historical bar pair and count matches
    Backtest {
        #[command(flatten)]
        args: ScanArgs,
        /// Rows in the latest-signals table
        #[arg(long, default_value_t = DEFAULT_LATEST)]
        latest: usize,
    },
    /// List instruments the data directory can serve
    List {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value = "1d")]
        interval: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan { args } => run_scan(&args, ScanMode::Live, DEFAULT_LATEST),
        Command::Backtest { args, latest } => run_scan(&args, ScanMode::Backtest, latest),
        Command::List { config, interval } => run_list(&config, &interval),
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ScanError> {
    info!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_scan_config(&adapter)?;
    Ok(adapter)
}

/// Config values with CLI flags layered on top.
pub fn build_scan_config(
    config: &dyn ConfigPort,
    args: &ScanArgs,
) -> Result<ScanConfig, ScanError> {
    let data_path = config
        .get_string("data", "path")
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ScanError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    let timeout_secs = match optional_int(config, "data", "timeout_secs")? {
        Some(v) if v <= 0 => return Err(ScanError::invalid("timeout_secs", "must be positive")),
        Some(v) => v as u64,
        None => DEFAULT_TIMEOUT_SECS,
    };

    let timeframes = if !args.timeframe.is_empty() {
        parse_timeframes(&args.timeframe.join(","))?
    } else {
        match config.get_string("scan", "timeframes") {
            Some(list) => parse_timeframes(&list)?,
            None => ScanConfig::default_timeframes(),
        }
    };

    let lookback_days = match args.lookback_days {
        Some(days) => Some(days),
        None => optional_int(config, "scan", "lookback_days")?,
    };
    let lookback = match lookback_days {
        Some(days) if days <= 0 => {
            return Err(ScanError::invalid("lookback_days", "must be positive"));
        }
        Some(days) => Some(
            Duration::try_days(days)
                .ok_or_else(|| ScanError::invalid("lookback_days", "out of range"))?,
        ),
        None => None,
    };

    let max_concurrency = match optional_int(config, "scan", "max_concurrency")? {
        Some(v) if v < 1 => {
            return Err(ScanError::invalid("max_concurrency", "must be at least 1"));
        }
        Some(v) => v as usize,
        None => DEFAULT_MAX_CONCURRENCY,
    };

    Ok(ScanConfig {
        data_path: PathBuf::from(data_path.trim()),
        timeout: std::time::Duration::from_secs(timeout_secs),
        timeframes,
        lookback,
        max_concurrency,
    })
}

/// CLI tickers when given, else the configured universe.
pub fn resolve_instruments(
    overrides: &[String],
    config: &dyn ConfigPort,
) -> Result<Vec<String>, ScanError> {
    if !overrides.is_empty() {
        return Ok(parse_codes(&overrides.join(","))?);
    }
    Ok(Universe::from_config(config)?.tickers())
}

fn run_scan(args: &ScanArgs, mode: ScanMode, latest: usize) -> Result<ExitCode, ScanError> {
    let adapter = load_config(&args.config)?;
    let scan_config = build_scan_config(&adapter, args)?;
    let instruments = resolve_instruments(&args.instrument, &adapter)?;

    let csv: Arc<dyn DataPort> = Arc::new(CsvAdapter::new(scan_config.data_path.clone()));
    let port = TimeoutDataPort::new(csv, scan_config.timeout);

    run_scan_pipeline(
        &port,
        &scan_config,
        &instruments,
        mode,
        Utc::now(),
        args.output.as_deref(),
        latest,
    )
}

pub fn run_scan_pipeline(
    port: &dyn DataPort,
    scan_config: &ScanConfig,
    instruments: &[String],
    mode: ScanMode,
    now: DateTime<Utc>,
    output: Option<&Path>,
    latest: usize,
) -> Result<ExitCode, ScanError> {
    let engine = ScanEngine::new(port, scan_config.max_concurrency)?;
    let report = engine.run(
        instruments,
        &scan_config.timeframes,
        mode,
        scan_config.lookback,
        now,
    )?;

    let failures = report.failures().len();
    if failures > 0 {
        warn!(
            "{} of {} units had no data; see warnings above",
            failures,
            report.units.len()
        );
    }

    print!("{}", render_report(&report, mode, latest));

    if let Some(dir) = output {
        CsvReportAdapter.write(&report, mode, dir)?;
        info!("Report written to: {}", dir.display());
    }

    Ok(ExitCode::SUCCESS)
}

pub fn format_signal(signal: &SignalRecord) -> String {
    format!(
        "{:<12} {:<3} {}  {:<8}  O {:.5}  H {:.5}  L {:.5}  C {:.5}",
        signal.instrument,
        signal.timeframe,
        signal.timestamp.format("%Y-%m-%d %H:%M"),
        signal.filter_kind,
        signal.open,
        signal.high,
        signal.low,
        signal.close,
    )
}

/// Text rendering for stdout.
pub fn render_report(report: &ScanReport, mode: ScanMode, latest: usize) -> String {
    let mut out = String::new();

    if report.signals.is_empty() {
        out.push_str("No signals found for the selected timeframe/period.\n");
        return out;
    }

    match mode {
        ScanMode::Live => {
            out.push_str("=== Current Signals ===\n");
            for signal in &report.signals {
                out.push_str(&format_signal(signal));
                out.push('\n');
            }
        }
        ScanMode::Backtest => {
            out.push_str("=== Latest Signals ===\n");
            for signal in report.latest(latest) {
                out.push_str(&format_signal(signal));
                out.push('\n');
            }
            out.push_str("\n=== Signals by Date ===\n");
            for row in report.summary() {
                out.push_str(&format!(
                    "{}  {:<8}  {}\n",
                    row.date.format("%Y-%m-%d"),
                    row.kind,
                    row.count
                ));
            }
            out.push_str(&format!("\nTotal signals: {}\n", report.signals.len()));
        }
    }
    out
}

fn run_list(config_path: &Path, interval: &str) -> Result<ExitCode, ScanError> {
    let adapter = load_config(config_path)?;
    let interval: BaseInterval = interval.parse()?;
    let scan_config = build_scan_config(&adapter, &ScanArgs::default())?;
    let port = CsvAdapter::new(scan_config.data_path);

    let tickers = port.list_instruments(interval)?;
    if tickers.is_empty() {
        eprintln!("No instruments found for interval {}", interval);
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} instruments found", tickers.len());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config_path: &Path) -> Result<ExitCode, ScanError> {
    let adapter = load_config(config_path)?;
    let scan_config = build_scan_config(&adapter, &ScanArgs::default())?;
    let universe = Universe::from_config(&adapter)?;

    eprintln!("Config validated successfully");
    eprintln!("\nData:");
    eprintln!("  path:    {}", scan_config.data_path.display());
    eprintln!("  timeout: {}s", scan_config.timeout.as_secs());

    eprintln!("\nScan:");
    let labels: Vec<&str> = scan_config.timeframes.iter().map(Timeframe::label).collect();
    eprintln!("  timeframes:      {}", labels.join(", "));
    match scan_config.lookback {
        Some(lb) => eprintln!("  lookback:        {} days", lb.num_days()),
        None => eprintln!("  lookback:        per-timeframe default"),
    }
    eprintln!("  max_concurrency: {}", scan_config.max_concurrency);

    eprintln!("\nUniverse ({} instruments):", universe.count());
    for class in AssetClass::all() {
        let tickers: Vec<&str> = universe
            .of_class(*class)
            .map(|i| i.ticker.as_str())
            .collect();
        eprintln!("  {}: {}", class, tickers.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}
