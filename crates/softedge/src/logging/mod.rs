//! Logging utilities.
//!
//! This module centralizes logger initialization and avoids imposing a
//! specific logging backend beyond the standard `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
