//! Configuration validation.
//!
//! Validates all config fields before a scan runs.

use crate::domain::error::ScanError;
use crate::domain::timeframe::parse_timeframes;
use crate::domain::universe::Universe;
use crate::ports::config_port::ConfigPort;
use chrono::Duration;

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_data_path(config)?;
    validate_timeout(config)?;
    validate_timeframes(config)?;
    validate_lookback(config)?;
    validate_max_concurrency(config)?;
    validate_universe(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScanError {
    ScanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `None` when the key is absent; an error when it is present but not an
/// integer.
pub fn optional_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, ScanError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, format!("expected an integer, got '{}'", raw))),
    }
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), ScanError> {
    if !config.has_value("data", "path") {
        return Err(ScanError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        });
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match optional_int(config, "data", "timeout_secs")? {
        Some(v) if v <= 0 => Err(invalid("data", "timeout_secs", "timeout_secs must be positive")),
        _ => Ok(()),
    }
}

fn validate_timeframes(config: &dyn ConfigPort) -> Result<(), ScanError> {
    if let Some(list) = config.get_string("scan", "timeframes") {
        parse_timeframes(&list).map_err(|e| invalid("scan", "timeframes", e.to_string()))?;
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match optional_int(config, "scan", "lookback_days")? {
        Some(v) if v <= 0 => Err(invalid("scan", "lookback_days", "lookback_days must be positive")),
        Some(v) if Duration::try_days(v).is_none() => {
            Err(invalid("scan", "lookback_days", "lookback_days is out of range"))
        }
        _ => Ok(()),
    }
}

fn validate_max_concurrency(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match optional_int(config, "scan", "max_concurrency")? {
        Some(v) if v < 1 => Err(invalid(
            "scan",
            "max_concurrency",
            "max_concurrency must be at least 1",
        )),
        _ => Ok(()),
    }
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), ScanError> {
    Universe::from_config(config).map_err(|e| invalid("universe", "codes", e.to_string()))?;
    Ok(())
}
