//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `stealchain` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Ctrl-C shutdown
//! - Exit codes for fatal startup errors
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::process;
use tokio_util::sync::CancellationToken;

use stealchain::config::Opt;
use stealchain::initialization::{init_crypto_provider, init_logger_with};
use stealchain::{ChainCaptureListener, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let config = Config::from(opt);
    let listener = match ChainCaptureListener::bind(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("stealchain-server error: {:#}", e);
            process::exit(e.exit_code());
        }
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("[+] interrupt received, shutting down");
                signal_token.cancel();
            }
            Err(e) => warn!("[!] cannot listen for Ctrl-C: {e}"),
        }
    });

    let report = listener.serve(shutdown).await;
    println!(
        "Captured {} chain{} from {} connection{} in {:.1}s",
        report.chains_captured,
        if report.chains_captured == 1 { "" } else { "s" },
        report.connections_accepted,
        if report.connections_accepted == 1 { "" } else { "s" },
        report.elapsed_seconds
    );
    Ok(())
}
