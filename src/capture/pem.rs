//! PEM encoding of certificate chains.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use rustls::pki_types::CertificateDer;

use crate::config::{PEM_CERTIFICATE_LABEL, PEM_LINE_WIDTH};

/// Encodes one DER certificate as a PEM `CERTIFICATE` block.
///
/// Base64 body wrapped at 64 columns, `\n` line endings, trailing newline.
pub fn encode_certificate(der: &[u8]) -> String {
    let body = BASE64_STANDARD.encode(der);
    let mut out = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);

    out.push_str("-----BEGIN ");
    out.push_str(PEM_CERTIFICATE_LABEL);
    out.push_str("-----\n");
    // base64 output is ASCII, so byte chunks are char boundaries
    for line in body.as_bytes().chunks(PEM_LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(PEM_CERTIFICATE_LABEL);
    out.push_str("-----\n");
    out
}

/// Encodes a chain as concatenated PEM blocks, in presentation order.
pub fn encode_chain(chain: &[CertificateDer<'_>]) -> Vec<u8> {
    chain
        .iter()
        .map(|cert| encode_certificate(cert.as_ref()))
        .collect::<String>()
        .into_bytes()
}
