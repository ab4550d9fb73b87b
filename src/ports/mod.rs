//! Port traits (interfaces) for the hexagonal architecture.

pub mod data_port;
pub mod config_port;
pub mod report_port;
