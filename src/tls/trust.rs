//! Trust store loading.

use std::io::BufReader;
use std::path::Path;

use log::{debug, info, warn};
use rustls::RootCertStore;

use crate::error_handling::InitializationError;

/// Reads and parses an alternate trust bundle.
///
/// # Returns
///
/// `Ok(None)` when the file holds no usable root; the caller then behaves as
/// if no bundle had been given.
///
/// # Errors
///
/// Returns `InitializationError::TrustBundleError` if the file cannot be read.
pub fn load_trust_bundle(path: &Path) -> Result<Option<RootCertStore>, InitializationError> {
    let pem = std::fs::read(path).map_err(|source| InitializationError::TrustBundleError {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes of trust bundle from {}", pem.len(), path.display());
    Ok(parse_trust_bundle(&pem))
}

/// Parses PEM `CERTIFICATE` blocks into a root store.
///
/// Blocks that fail to decode or parse are skipped. Returns `None` (with a
/// warning) when nothing usable remains.
pub fn parse_trust_bundle(pem: &[u8]) -> Option<RootCertStore> {
    let mut reader = BufReader::new(pem);
    let certs = rustls_pemfile::certs(&mut reader).filter_map(|cert| match cert {
        Ok(cert) => Some(cert),
        Err(e) => {
            debug!("Skipping undecodable PEM block in trust bundle: {e}");
            None
        }
    });

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if ignored > 0 {
        warn!("[!] ignored {ignored} unparseable certificate(s) in trust bundle");
    }
    if added == 0 {
        warn!("[!] no valid roots found");
        return None;
    }

    info!("[+] loaded {added} trusted root(s)");
    Some(roots)
}

/// The default roots used for client verification when no bundle is active.
pub fn default_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}
