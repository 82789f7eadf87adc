//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, exit codes, artifact format)
//! - CLI option types and parsing
//! - The library `Config` and its validation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{parse_listen_addr, Config, ConfigError, LogFormat, LogLevel, Opt};
