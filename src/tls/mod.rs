//! TLS server configuration.
//!
//! This module builds the single, immutable `rustls::ServerConfig` shared by
//! every connection:
//! - Trust store: an alternate PEM bundle, or the bundled Mozilla roots
//! - Server identity: PEM certificate and key, or an ephemeral self-signed pair
//! - Client authentication: WebPKI verification when `verify` is set,
//!   otherwise an optional request that accepts any chain
//!
//! Uses `tokio-rustls`/`rustls` for the handshake and `x509-parser` for log
//! summaries of captured certificates.

mod extract;
mod identity;
mod trust;
mod verifier;

use std::sync::Arc;

use log::{info, warn};
use rustls::server::danger::ClientCertVerifier;
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::initialization::crypto_provider;

// Re-export public API
pub(crate) use extract::summarize_certificate;
pub use extract::CertificateSummary;
pub use identity::ServerIdentity;
pub use trust::{default_roots, load_trust_bundle, parse_trust_bundle};
pub use verifier::CaptureAnyClientCert;

/// Builds the server configuration described by `config`.
///
/// Reads the trust bundle (if any) and the server identity (or generates one).
///
/// # Errors
///
/// Returns an `InitializationError` if the bundle or identity files cannot be
/// read, or if rustls rejects the resulting configuration. A bundle with no
/// usable roots is not an error.
pub fn load_server_config(config: &Config) -> Result<Arc<ServerConfig>, InitializationError> {
    let trust = match &config.ca_bundle {
        Some(path) => load_trust_bundle(path)?,
        None => None,
    };
    if trust.is_some() && !config.verify {
        warn!("[!] trust bundle loaded but --verify is off; client chains will not be checked");
    }

    let identity = match (&config.cert, &config.key) {
        (Some(cert), Some(key)) => ServerIdentity::from_pem_files(cert, key)?,
        _ => {
            info!("[+] no server certificate configured, generating a self-signed one");
            ServerIdentity::ephemeral()?
        }
    };

    build_server_config(config.verify, trust, identity)
}

/// Assembles a `ServerConfig` from already-loaded parts.
///
/// With `verify` set, clients must present a chain that verifies against
/// `trust` (or [`default_roots`] when `trust` is `None`). Without it, a chain
/// is requested but optional and never checked.
///
/// # Errors
///
/// Returns `InitializationError::TlsConfigError` if the verifier or the
/// config cannot be built (e.g. the private key cannot be loaded).
pub fn build_server_config(
    verify: bool,
    trust: Option<RootCertStore>,
    identity: ServerIdentity,
) -> Result<Arc<ServerConfig>, InitializationError> {
    let provider = crypto_provider();

    let client_verifier: Arc<dyn ClientCertVerifier> = if verify {
        let roots = trust.unwrap_or_else(default_roots);
        info!(
            "[+] client certificates required, verifying against {} root(s)",
            roots.len()
        );
        WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
            .build()
            .map_err(|e| {
                InitializationError::TlsConfigError(format!("client verifier: {e}"))
            })?
    } else {
        info!("[+] client certificates requested, any chain accepted");
        Arc::new(CaptureAnyClientCert::new(provider.clone()))
    };

    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| InitializationError::TlsConfigError(e.to_string()))?
        .with_client_cert_verifier(client_verifier)
        .with_single_cert(identity.cert_chain, identity.key)
        .map_err(|e| InitializationError::TlsConfigError(e.to_string()))?;

    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_capture_config() {
        let identity = ServerIdentity::ephemeral().unwrap();
        assert!(build_server_config(false, None, identity).is_ok());
    }

    #[test]
    fn test_build_verifying_config_with_default_roots() {
        let identity = ServerIdentity::ephemeral().unwrap();
        assert!(build_server_config(true, None, identity).is_ok());
    }

    #[test]
    fn test_unusable_key_is_rejected() {
        let mut identity = ServerIdentity::ephemeral().unwrap();
        identity.key = rustls::pki_types::PrivateKeyDer::Pkcs8(vec![0x30, 0x00].into());
        let err = build_server_config(false, None, identity).unwrap_err();
        assert!(matches!(err, InitializationError::TlsConfigError(_)));
    }

    #[test]
    fn test_load_server_config_missing_bundle_is_fatal() {
        let config = Config {
            ca_bundle: Some(std::path::PathBuf::from("/nonexistent/roots.pem")),
            ..Default::default()
        };
        let err = load_server_config(&config).unwrap_err();
        assert!(matches!(err, InitializationError::TrustBundleError { .. }));
    }
}
