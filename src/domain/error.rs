//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for candlescan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("no data for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ScanError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(ticker: &str, reason: impl Into<String>) -> Self {
        ScanError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. } => 2,
            ScanError::InvalidParameter { .. } | ScanError::Universe(_) => 3,
            ScanError::DataUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
