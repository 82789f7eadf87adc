//! Configuration constants.
//!
//! This module defines the defaults, exit codes, and artifact format constants
//! used throughout the application.

use std::time::Duration;

/// Default listen address: the standard HTTPS port on all interfaces.
pub const DEFAULT_LISTEN_ADDR: &str = ":443";

/// Host used when the listen address omits one (e.g. `:443`).
pub const UNSPECIFIED_HOST: &str = "0.0.0.0";

/// Default directory for captured chain artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Handshake timeout in seconds. 0 leaves the handshake unbounded.
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 0;

/// How long in-flight connections may run after shutdown is requested.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Pause after a failed `accept()` so a persistent error (e.g. EMFILE) cannot spin the loop.
pub const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(100);

// Exit codes
/// Exit status for fatal startup errors (trust bundle, identity, logger).
pub const EXIT_STARTUP_FAILURE: i32 = 1;
/// Exit status when the listen address cannot be bound.
pub const EXIT_BIND_FAILURE: i32 = 2;

// Artifact format
/// Nonce length in bytes (128 bits).
pub const NONCE_LEN: usize = 16;
/// File extension of captured chain artifacts.
pub const ARTIFACT_EXTENSION: &str = "pem";
/// PEM block label for each certificate.
pub const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";
/// Base64 characters per PEM body line.
pub const PEM_LINE_WIDTH: usize = 64;
/// Unix permissions of written artifacts.
pub const ARTIFACT_MODE: u32 = 0o644;

/// Host name placed in the ephemeral self-signed server certificate.
pub const EPHEMERAL_CERT_HOST: &str = "localhost";
