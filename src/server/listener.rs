//! The accept loop.

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

use super::session::{handle_connection, CaptureContext};
use super::CaptureReport;
use crate::config::{parse_listen_addr, Config, ACCEPT_ERROR_PAUSE, SHUTDOWN_GRACE_PERIOD};
use crate::error_handling::{CaptureEvent, CaptureStats, InitializationError};
use crate::tls::load_server_config;

/// A bound TLS listener that captures client certificate chains.
///
/// Construction performs every fallible startup step; once `bind` returns,
/// nothing short of cancellation stops [`ChainCaptureListener::serve`].
pub struct ChainCaptureListener {
    listener: TcpListener,
    ctx: CaptureContext,
}

impl ChainCaptureListener {
    /// Loads the TLS configuration and binds the listen address.
    ///
    /// # Errors
    ///
    /// Returns an `InitializationError` if the configuration is invalid, the
    /// trust bundle or server identity cannot be read, the output directory
    /// is unusable, or the address cannot be bound.
    pub async fn bind(config: &Config) -> Result<Self, InitializationError> {
        config.validate()?;
        let tls_config = load_server_config(config)?;
        check_output_dir(&config.output_dir)?;

        let addr = parse_listen_addr(&config.listen_addr)?;
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| InitializationError::BindError {
                addr: addr.clone(),
                source,
            })?;

        if let Ok(local) = listener.local_addr() {
            info!("[+] listening on {local}");
        }

        Ok(Self {
            listener,
            ctx: CaptureContext {
                acceptor: TlsAcceptor::from(tls_config),
                output_dir: Arc::new(config.output_dir.clone()),
                handshake_timeout: config.handshake_timeout(),
                stats: Arc::new(CaptureStats::new()),
            },
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Live counters, shared with every connection task.
    pub fn stats(&self) -> Arc<CaptureStats> {
        Arc::clone(&self.ctx.stats)
    }

    /// Accepts connections until `shutdown` is cancelled.
    ///
    /// Each connection runs in its own task. Accept errors are logged and the
    /// loop continues. After cancellation, in-flight connections get
    /// `SHUTDOWN_GRACE_PERIOD` to finish before they are aborted.
    pub async fn serve(self, shutdown: CancellationToken) -> CaptureReport {
        let start_time = Instant::now();
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("[!] connection task panicked: {e}");
                        }
                    }
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        self.ctx.stats.record(CaptureEvent::ConnectionAccepted);
                        debug!("{remote_addr}: connection accepted");
                        tasks.spawn(handle_connection(self.ctx.clone(), stream, remote_addr));
                    }
                    Err(e) => accept_failed(&self.ctx.stats, e).await,
                }
            }
        }

        drop(self.listener);
        drain_tasks(&mut tasks).await;

        self.ctx.stats.log_summary();
        CaptureReport::from_stats(&self.ctx.stats, start_time.elapsed().as_secs_f64())
    }
}

/// Counts and logs a failed `accept()`, then pauses before the next attempt.
async fn accept_failed(stats: &CaptureStats, e: io::Error) {
    stats.record(CaptureEvent::AcceptError);
    error!("[!] accept failed: {e}");
    tokio::time::sleep(ACCEPT_ERROR_PAUSE).await;
}

/// Waits for in-flight connections, aborting whatever outlives the grace period.
async fn drain_tasks(tasks: &mut JoinSet<()>) {
    if tasks.is_empty() {
        return;
    }
    info!(
        "[+] waiting up to {}s for {} in-flight connection(s)",
        SHUTDOWN_GRACE_PERIOD.as_secs(),
        tasks.len()
    );
    let drained = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, async {
        while tasks.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!("[!] aborting {} stalled connection(s)", tasks.len());
        tasks.shutdown().await;
    }
}

fn check_output_dir(dir: &Path) -> Result<(), InitializationError> {
    let invalid = |reason: String| InitializationError::OutputDirError {
        path: dir.to_path_buf(),
        reason,
    };
    let metadata = std::fs::metadata(dir).map_err(|e| invalid(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    Ok(())
}
