//! Chain-capture listener.
//!
//! This module owns the listening socket and the per-connection tasks:
//! - `listener`: binding, the accept loop, shutdown
//! - `session`: handshake, chain extraction, artifact write
//!
//! The only state shared between connections is the immutable TLS
//! configuration, the output directory, and the event counters.

mod listener;
mod session;

use crate::error_handling::{CaptureEvent, CaptureStats};

// Re-export public API
pub use listener::ChainCaptureListener;
pub use session::{capture_chain, ConnectionSession};

/// Summary of a listener run, returned when it shuts down.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// TCP connections accepted
    pub connections_accepted: usize,
    /// Artifacts written
    pub chains_captured: usize,
    /// Connections that completed the handshake without a certificate
    pub no_chain_presented: usize,
    /// Handshakes that failed or timed out
    pub handshake_failures: usize,
    /// Nonce or write failures
    pub capture_failures: usize,
    /// Failed `accept()` calls
    pub accept_errors: usize,
    /// Accepted connections that ended without an artifact, for any reason
    pub without_artifact: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl CaptureReport {
    pub(crate) fn from_stats(stats: &CaptureStats, elapsed_seconds: f64) -> Self {
        Self {
            connections_accepted: stats.count(CaptureEvent::ConnectionAccepted),
            chains_captured: stats.count(CaptureEvent::ChainCaptured),
            no_chain_presented: stats.count(CaptureEvent::NoChainPresented),
            handshake_failures: stats.count(CaptureEvent::HandshakeFailed)
                + stats.count(CaptureEvent::HandshakeTimeout),
            capture_failures: stats.count(CaptureEvent::CaptureFailed),
            accept_errors: stats.count(CaptureEvent::AcceptError),
            without_artifact: stats.total_without_artifact(),
            elapsed_seconds,
        }
    }
}
