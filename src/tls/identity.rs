//! Server certificate and key.

use std::io::BufReader;
use std::path::Path;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};

use crate::config::EPHEMERAL_CERT_HOST;
use crate::error_handling::InitializationError;

/// Certificate chain and private key presented by the listener.
pub struct ServerIdentity {
    /// Server chain, leaf first
    pub cert_chain: Vec<CertificateDer<'static>>,
    /// Private key for the leaf
    pub key: PrivateKeyDer<'static>,
}

impl std::fmt::Debug for ServerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerIdentity")
            .field("cert_chain_len", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}

impl ServerIdentity {
    /// Loads a PEM certificate chain and private key from disk.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::IdentityError` if either file is unreadable
    /// or holds no usable material.
    pub fn from_pem_files(cert: &Path, key: &Path) -> Result<Self, InitializationError> {
        let cert_pem = std::fs::read(cert).map_err(|e| {
            InitializationError::IdentityError(format!("cannot read {}: {e}", cert.display()))
        })?;
        let key_pem = std::fs::read(key).map_err(|e| {
            InitializationError::IdentityError(format!("cannot read {}: {e}", key.display()))
        })?;
        Self::from_pem(&cert_pem, &key_pem)
    }

    /// Parses a PEM certificate chain and private key.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::IdentityError` if no certificate or no key
    /// is found.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, InitializationError> {
        let cert_chain = rustls_pemfile::certs(&mut BufReader::new(cert_pem))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                InitializationError::IdentityError(format!("bad certificate PEM: {e}"))
            })?;
        if cert_chain.is_empty() {
            return Err(InitializationError::IdentityError(
                "no certificate found in PEM data".to_string(),
            ));
        }

        let key = rustls_pemfile::private_key(&mut BufReader::new(key_pem))
            .map_err(|e| InitializationError::IdentityError(format!("bad key PEM: {e}")))?
            .ok_or_else(|| {
                InitializationError::IdentityError("no private key found in PEM data".to_string())
            })?;

        Ok(Self { cert_chain, key })
    }

    /// Generates a throwaway self-signed identity for `localhost`.
    ///
    /// Peers will not trust it; they only need to get far enough into the
    /// handshake to send their own chain.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::IdentityError` if key or certificate
    /// generation fails.
    pub fn ephemeral() -> Result<Self, InitializationError> {
        let certified = rcgen::generate_simple_self_signed(vec![EPHEMERAL_CERT_HOST.to_string()])
            .map_err(|e| {
                InitializationError::IdentityError(format!("self-signed generation failed: {e}"))
            })?;

        Ok(Self {
            cert_chain: vec![certified.cert.der().clone()],
            key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
                certified.key_pair.serialize_der(),
            )),
        })
    }
}
