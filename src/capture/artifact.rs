//! Captured chain artifacts.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rustls::pki_types::CertificateDer;
use tokio::io::AsyncWriteExt;

use super::nonce::Nonce;
use super::pem::encode_chain;
use crate::config::ARTIFACT_EXTENSION;
#[cfg(unix)]
use crate::config::ARTIFACT_MODE;
use crate::error_handling::CaptureError;

/// One presented chain, ready to be written.
#[derive(Debug, Clone)]
pub struct CapturedChain {
    remote_addr: SocketAddr,
    nonce: Nonce,
    payload: Vec<u8>,
}

impl CapturedChain {
    /// PEM-encodes `chain` and pairs it with a fresh nonce.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Nonce` if no nonce can be drawn.
    pub fn new(
        remote_addr: SocketAddr,
        chain: &[CertificateDer<'_>],
    ) -> Result<Self, CaptureError> {
        Ok(Self::with_nonce(remote_addr, Nonce::generate()?, chain))
    }

    /// Like [`CapturedChain::new`], with a caller-chosen nonce.
    pub fn with_nonce(
        remote_addr: SocketAddr,
        nonce: Nonce,
        chain: &[CertificateDer<'_>],
    ) -> Self {
        Self {
            remote_addr,
            nonce,
            payload: encode_chain(chain),
        }
    }

    /// `<remote-address>-<32 hex chars>.pem`
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.remote_addr, self.nonce, ARTIFACT_EXTENSION)
    }

    /// Concatenated PEM blocks.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Writes the artifact into `dir` and returns its path.
    ///
    /// The file is created fresh (an existing file of the same name is an
    /// error, never overwritten) with mode `0644` on Unix.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Write` if the file cannot be created or written.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, CaptureError> {
        let path = dir.join(self.file_name());
        let write_err = |source| CaptureError::Write {
            path: path.clone(),
            source,
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(ARTIFACT_MODE);

        let mut file = options.open(&path).await.map_err(write_err)?;
        file.write_all(&self.payload).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        Ok(path)
    }
}
