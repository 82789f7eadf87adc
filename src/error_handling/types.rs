//! Error type definitions.
//!
//! This module defines the startup and per-connection error types, and the
//! connection events counted by [`super::CaptureStats`].

use std::io;
use std::path::PathBuf;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::{ConfigError, EXIT_BIND_FAILURE, EXIT_STARTUP_FAILURE};

/// Error types for startup failures.
///
/// Every variant is fatal: the process exits before accepting a connection.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The configuration can never start a listener.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// The alternate trust bundle could not be read.
    #[error("Trust bundle error: cannot read {}: {source}", .path.display())]
    TrustBundleError {
        /// Path given on the command line
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The server certificate or key could not be loaded or generated.
    #[error("Server identity error: {0}")]
    IdentityError(String),

    /// rustls rejected the handshake configuration.
    #[error("TLS configuration error: {0}")]
    TlsConfigError(String),

    /// The artifact directory is missing or not a directory.
    #[error("Output directory error: {}: {reason}", .path.display())]
    OutputDirError {
        /// Configured output directory
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// The listen address could not be bound.
    #[error("Listen error: cannot bind {addr}: {source}")]
    BindError {
        /// Address that was requested
        addr: String,
        /// Underlying socket failure
        source: io::Error,
    },
}

impl InitializationError {
    /// Process exit status for this failure.
    ///
    /// Bind failures get their own status so that supervisors can tell a
    /// port conflict apart from a bad configuration.
    pub fn exit_code(&self) -> i32 {
        match self {
            InitializationError::BindError { .. } => EXIT_BIND_FAILURE,
            _ => EXIT_STARTUP_FAILURE,
        }
    }
}

/// Failures while persisting one captured chain.
///
/// These are isolated to the connection that produced them.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The OS random source failed to produce a nonce.
    #[error("random source failure: {0}")]
    Nonce(String),

    /// The artifact could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        /// Artifact path
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },
}

/// Outcomes and events observed by the listener.
///
/// Counted per occurrence; see [`super::CaptureStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum CaptureEvent {
    /// A TCP connection was accepted
    ConnectionAccepted,
    /// `accept()` itself failed
    AcceptError,
    /// The TLS handshake failed (including verification rejections)
    HandshakeFailed,
    /// The handshake did not finish within the configured bound
    HandshakeTimeout,
    /// The peer completed the handshake without a certificate
    NoChainPresented,
    /// A chain was written to disk
    ChainCaptured,
    /// Nonce generation or the artifact write failed
    CaptureFailed,
}

impl CaptureEvent {
    /// Short label used in the shutdown summary.
    pub fn label(&self) -> &'static str {
        match self {
            CaptureEvent::ConnectionAccepted => "connections accepted",
            CaptureEvent::AcceptError => "accept errors",
            CaptureEvent::HandshakeFailed => "handshake failures",
            CaptureEvent::HandshakeTimeout => "handshake timeouts",
            CaptureEvent::NoChainPresented => "no chain presented",
            CaptureEvent::ChainCaptured => "chains captured",
            CaptureEvent::CaptureFailed => "capture failures",
        }
    }
}
