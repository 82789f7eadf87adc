//! Per-connection handling.
//!
//! One task per accepted connection: handshake, extract the peer chain,
//! write the artifact. Nothing here can stop the accept loop.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use rustls::pki_types::CertificateDer;
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;

use crate::capture::CapturedChain;
use crate::error_handling::{CaptureError, CaptureEvent, CaptureStats};
use crate::tls::summarize_certificate;

/// Everything a connection task needs, shared read-only between tasks.
#[derive(Clone)]
pub(crate) struct CaptureContext {
    pub acceptor: TlsAcceptor,
    pub output_dir: Arc<PathBuf>,
    pub handshake_timeout: Option<Duration>,
    pub stats: Arc<CaptureStats>,
}

/// A connection whose TLS handshake has completed.
pub struct ConnectionSession {
    remote_addr: SocketAddr,
    stream: TlsStream<TcpStream>,
}

impl ConnectionSession {
    /// Peer address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Certificates the peer presented, leaf first. Empty if none.
    pub fn peer_chain(&self) -> Vec<CertificateDer<'static>> {
        self.stream
            .get_ref()
            .1
            .peer_certificates()
            .map(<[CertificateDer<'static>]>::to_vec)
            .unwrap_or_default()
    }

    /// Negotiated protocol version and cipher suite, for logging.
    pub fn negotiated(&self) -> (String, String) {
        let conn = self.stream.get_ref().1;
        let version = conn
            .protocol_version()
            .map(|v| format!("{v:?}"))
            .unwrap_or_else(|| "Unknown".to_string());
        let suite = conn
            .negotiated_cipher_suite()
            .map(|cs| format!("{:?}", cs.suite()))
            .unwrap_or_else(|| "Unknown".to_string());
        (version, suite)
    }
}

/// Handles one accepted connection from handshake to artifact.
pub(crate) async fn handle_connection(
    ctx: CaptureContext,
    stream: TcpStream,
    remote_addr: SocketAddr,
) {
    let Some(session) = handshake(&ctx, stream, remote_addr).await else {
        return;
    };

    let (version, suite) = session.negotiated();
    debug!(
        "{}: handshake complete ({version}, {suite})",
        session.remote_addr()
    );

    let chain = session.peer_chain();
    // The chain is all we need from the connection
    drop(session);

    match capture_chain(remote_addr, &chain, &ctx.output_dir).await {
        Ok(Some(path)) => {
            ctx.stats.record(CaptureEvent::ChainCaptured);
            info!("{}", wrote_line(remote_addr, &path));
        }
        Ok(None) => {
            ctx.stats.record(CaptureEvent::NoChainPresented);
            info!("[+] {remote_addr}: no chain presented");
        }
        Err(e) => {
            ctx.stats.record(CaptureEvent::CaptureFailed);
            error!("[!] {remote_addr}: capture failed: {e}");
        }
    }
}

/// Confirmation line for a written artifact: `<addr>: [+] wrote <file>.`
fn wrote_line(remote_addr: SocketAddr, path: &Path) -> String {
    format!("{remote_addr}: [+] wrote {}.", path.display())
}

/// Drives the server handshake to completion, honoring the optional bound.
async fn handshake(
    ctx: &CaptureContext,
    stream: TcpStream,
    remote_addr: SocketAddr,
) -> Option<ConnectionSession> {
    let accept = ctx.acceptor.accept(stream);
    let result = match ctx.handshake_timeout {
        Some(limit) => match tokio::time::timeout(limit, accept).await {
            Ok(result) => result,
            Err(_) => {
                ctx.stats.record(CaptureEvent::HandshakeTimeout);
                warn!(
                    "[!] {remote_addr}: handshake timed out after {}s",
                    limit.as_secs()
                );
                return None;
            }
        },
        None => accept.await,
    };

    match result {
        Ok(stream) => Some(ConnectionSession {
            remote_addr,
            stream,
        }),
        Err(e) => {
            ctx.stats.record(CaptureEvent::HandshakeFailed);
            warn!("[!] {remote_addr}: handshake failed: {e}");
            None
        }
    }
}

/// Writes `chain` as an artifact in `output_dir`.
///
/// # Returns
///
/// `Ok(None)` when the chain is empty (no file is produced), otherwise the
/// path of the new artifact.
///
/// # Errors
///
/// Returns a `CaptureError` if the nonce cannot be drawn or the file cannot
/// be written.
pub async fn capture_chain(
    remote_addr: SocketAddr,
    chain: &[CertificateDer<'_>],
    output_dir: &Path,
) -> Result<Option<PathBuf>, CaptureError> {
    if chain.is_empty() {
        return Ok(None);
    }

    for (depth, cert) in chain.iter().enumerate() {
        match summarize_certificate(cert.as_ref()) {
            Some(summary) => debug!(
                "{remote_addr}: chain[{depth}] subject={} issuer={} dns={:?}",
                summary.subject, summary.issuer, summary.dns_names
            ),
            None => debug!(
                "{remote_addr}: chain[{depth}] unparseable ({} bytes)",
                cert.len()
            ),
        }
    }

    let artifact = CapturedChain::new(remote_addr, chain)?;
    let path = artifact.write_to(output_dir).await?;
    Ok(Some(path))
}
