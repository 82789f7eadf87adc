// Shared test helpers: a throwaway PKI, a running listener, and TLS clients.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Each test file uses a different subset

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair,
};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tokio_util::sync::CancellationToken;

use stealchain::error_handling::{CaptureEvent, CaptureStats};
use stealchain::initialization::init_crypto_provider;
use stealchain::{CaptureReport, ChainCaptureListener, Config};

/// Name the server certificate is issued for.
pub const SERVER_NAME: &str = "localhost";

/// An issued certificate with its key.
pub struct Issued {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issued {
    pub fn der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    pub fn private_key(&self) -> PrivateKeyDer<'static> {
        PrivatePkcs8KeyDer::from(self.key.serialize_der()).into()
    }
}

/// Root CA -> intermediate CA -> leaves, plus a directory holding the PEM files.
pub struct TestPki {
    pub root: Issued,
    pub intermediate: Issued,
    pub server: Issued,
    pub dir: TempDir,
}

impl TestPki {
    pub fn new() -> Self {
        init_crypto_provider();

        let root = self_signed_ca("stealchain test root");
        let intermediate = issue_ca("stealchain test intermediate", &root);
        let server = issue_leaf(SERVER_NAME, ExtendedKeyUsagePurpose::ServerAuth, &root);
        let dir = TempDir::new().expect("Failed to create PKI directory");

        TestPki {
            root,
            intermediate,
            server,
            dir,
        }
    }

    /// A client certificate signed by the intermediate.
    pub fn client(&self, name: &str) -> Issued {
        issue_leaf(name, ExtendedKeyUsagePurpose::ClientAuth, &self.intermediate)
    }

    /// Leaf first, then the intermediate.
    pub fn client_chain(&self, client: &Issued) -> Vec<CertificateDer<'static>> {
        vec![client.der(), self.intermediate.der()]
    }

    pub fn root_pem_path(&self) -> PathBuf {
        write_file(self.dir.path(), "root.pem", &self.root.cert.pem())
    }

    pub fn server_cert_path(&self) -> PathBuf {
        write_file(self.dir.path(), "server.pem", &self.server.cert.pem())
    }

    pub fn server_key_path(&self) -> PathBuf {
        write_file(self.dir.path(), "server.key", &self.server.key.serialize_pem())
    }

    /// Listener config that serves the PKI's server certificate on an ephemeral port.
    pub fn listener_config(&self, output_dir: &Path) -> Config {
        Config {
            listen_addr: "127.0.0.1:0".to_string(),
            cert: Some(self.server_cert_path()),
            key: Some(self.server_key_path()),
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        }
    }

    /// Client config trusting the test root, optionally presenting a chain.
    pub fn client_config(
        &self,
        identity: Option<(&Issued, Vec<CertificateDer<'static>>)>,
    ) -> ClientConfig {
        let mut roots = RootCertStore::empty();
        roots
            .add(self.root.der())
            .expect("Failed to add test root");
        let builder = ClientConfig::builder().with_root_certificates(roots);
        match identity {
            Some((issued, chain)) => builder
                .with_client_auth_cert(chain, issued.private_key())
                .expect("Failed to set client certificate"),
            None => builder.with_no_client_auth(),
        }
    }
}

pub fn self_signed_ca(name: &str) -> Issued {
    let key = KeyPair::generate().expect("Failed to generate CA key");
    let cert = ca_params(name)
        .self_signed(&key)
        .expect("Failed to self-sign CA");
    Issued { cert, key }
}

fn issue_ca(name: &str, issuer: &Issued) -> Issued {
    let key = KeyPair::generate().expect("Failed to generate CA key");
    let cert = ca_params(name)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .expect("Failed to sign intermediate");
    Issued { cert, key }
}

fn ca_params(name: &str) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).expect("Invalid CA params");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.distinguished_name.push(DnType::CommonName, name);
    params
}

fn issue_leaf(name: &str, usage: ExtendedKeyUsagePurpose, issuer: &Issued) -> Issued {
    let key = KeyPair::generate().expect("Failed to generate leaf key");
    let mut params = CertificateParams::new(vec![name.to_string()]).expect("Invalid leaf params");
    params.distinguished_name.push(DnType::CommonName, name);
    params.extended_key_usages = vec![usage];
    let cert = params
        .signed_by(&key, &issuer.cert, &issuer.key)
        .expect("Failed to sign leaf");
    Issued { cert, key }
}

/// A self-signed client certificate nobody trusts.
pub fn untrusted_client(name: &str) -> Issued {
    let key = KeyPair::generate().expect("Failed to generate client key");
    let mut params = CertificateParams::new(vec![name.to_string()]).expect("Invalid client params");
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ClientAuth];
    let cert = params.self_signed(&key).expect("Failed to self-sign client");
    Issued { cert, key }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// A listener serving in a background task.
pub struct RunningListener {
    pub addr: SocketAddr,
    pub stats: Arc<CaptureStats>,
    pub shutdown: CancellationToken,
    pub handle: JoinHandle<CaptureReport>,
}

impl RunningListener {
    pub async fn start(config: &Config) -> Self {
        let listener = ChainCaptureListener::bind(config)
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let stats = listener.stats();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(listener.serve(shutdown.clone()));
        RunningListener {
            addr,
            stats,
            shutdown,
            handle,
        }
    }

    /// Cancels the listener and returns its report.
    pub async fn stop(self) -> CaptureReport {
        self.shutdown.cancel();
        self.handle.await.expect("Listener task panicked")
    }

    /// Polls until `event` has been recorded at least `count` times.
    pub async fn wait_for(&self, event: CaptureEvent, count: usize) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while tokio::time::Instant::now() < deadline {
            if self.stats.count(event) >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

/// Connects to `addr` and runs the client side of the handshake.
pub async fn connect(
    addr: SocketAddr,
    config: ClientConfig,
) -> std::io::Result<TlsStream<TcpStream>> {
    let connector = TlsConnector::from(Arc::new(config));
    let tcp = TcpStream::connect(addr).await?;
    let name = ServerName::try_from(SERVER_NAME).expect("Invalid server name");
    connector.connect(name, tcp).await
}

/// Artifacts currently in `dir`, sorted by name.
pub fn artifacts(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("Failed to read output directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "pem"))
        .collect();
    paths.sort();
    paths
}

/// Decodes every CERTIFICATE block in an artifact, in file order.
pub fn read_artifact(path: &Path) -> Vec<CertificateDer<'static>> {
    let bytes = std::fs::read(path).expect("Failed to read artifact");
    rustls_pemfile::certs(&mut bytes.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .expect("Artifact is not valid PEM")
}
