//! Error handling and capture statistics.
//!
//! This module provides:
//! - Startup error types and their exit codes
//! - Per-connection capture error types
//! - Capture statistics tracking (one counter per connection event)
//!
//! Startup errors are fatal. Everything that happens after the listener is
//! bound is counted and logged, and never stops the accept loop.

mod stats;
mod types;

// Re-export public API
pub use stats::CaptureStats;
pub use types::{CaptureError, CaptureEvent, InitializationError};
