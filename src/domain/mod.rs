//! Core domain types and logic.

pub mod bar;
pub mod timeframe;
pub mod aggregator;
pub mod filter;
pub mod signal;
pub mod scanner;
pub mod universe;
pub mod scan_config;
pub mod config_validation;
pub mod error;
