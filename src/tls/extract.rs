//! Certificate summary extraction for log output.

use x509_parser::extensions::{GeneralName, ParsedExtension};

/// Human-readable identity of one captured certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    /// Subject distinguished name
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    /// DNS names from the Subject Alternative Name extension
    pub dns_names: Vec<String>,
}

/// Parses enough of a DER certificate to describe it in a log line.
///
/// Returns `None` if the certificate does not parse. Capture never depends
/// on this succeeding.
pub(crate) fn summarize_certificate(der: &[u8]) -> Option<CertificateSummary> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).ok()?;

    let mut dns_names = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    dns_names.push(dns_name.to_string());
                }
            }
        }
    }

    Some(CertificateSummary {
        subject: cert.tbs_certificate.subject.to_string(),
        issuer: cert.tbs_certificate.issuer.to_string(),
        dns_names,
    })
}
