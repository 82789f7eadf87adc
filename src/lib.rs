//! stealchain library: capture client certificate chains from TLS handshakes
//!
//! This library runs a TLS listener that asks every client for a certificate,
//! and writes each chain it receives to its own PEM file named after the
//! peer's address and a random nonce.
//!
//! # Example
//!
//! ```no_run
//! use stealchain::{ChainCaptureListener, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     listen_addr: "127.0.0.1:8443".to_string(),
//!     ..Default::default()
//! };
//!
//! let listener = ChainCaptureListener::bind(&config).await?;
//! let shutdown = CancellationToken::new();
//! let report = listener.serve(shutdown).await;
//! println!("captured {} chains", report.chains_captured);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod capture;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod server;
pub mod tls;

// Re-export public API
pub use capture::CapturedChain;
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{CaptureError, InitializationError};
pub use server::{CaptureReport, ChainCaptureListener};
