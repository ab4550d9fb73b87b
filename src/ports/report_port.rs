//! Report generation port trait.

use crate::domain::error::ScanError;
use crate::domain::scanner::{ScanMode, ScanReport};
use std::path::Path;

/// Port for persisting scan results for the presentation layer.
pub trait ReportPort {
    fn write(&self, report: &ScanReport, mode: ScanMode, output_dir: &Path)
        -> Result<(), ScanError>;
}
