//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::config::constants::{
    DEFAULT_HANDSHAKE_TIMEOUT_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_OUTPUT_DIR, UNSPECIFIED_HOST,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Errors reported by [`Config::validate`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The listen address has no usable `host:port` form.
    #[error("invalid listen address {0:?}: expected host:port")]
    InvalidListenAddr(String),

    /// Only one half of the server identity was configured.
    #[error("--cert and --key must be supplied together")]
    IncompleteIdentity,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Capture whatever chains clients offer on :443
/// stealchain-server
///
/// # Require chains issued by a private CA, on a high port
/// stealchain-server --listen 127.0.0.1:8443 --verify --ca ./roots.pem
///
/// # Serve a real certificate and keep artifacts out of the CWD
/// stealchain-server --cert server.pem --key server.key --output-dir ./chains
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "stealchain-server",
    about = "Accepts TLS connections and saves every client certificate chain presented."
)]
pub struct Opt {
    /// Alternate CA bundle (PEM) used to verify client certificates
    #[arg(long, default_value = "")]
    pub ca: String,

    /// Address to listen on (host:port, or :port for all interfaces)
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,

    /// Require and verify client certificates
    #[arg(long)]
    pub verify: bool,

    /// Server certificate chain (PEM). A self-signed certificate is generated when omitted
    #[arg(long, value_parser)]
    pub cert: Option<PathBuf>,

    /// Server private key (PEM)
    #[arg(long, value_parser)]
    pub key: Option<PathBuf>,

    /// Directory that receives captured chains
    #[arg(long, value_parser, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Per-connection handshake timeout in seconds (0 waits forever)
    #[arg(long, default_value_t = DEFAULT_HANDSHAKE_TIMEOUT_SECS)]
    pub handshake_timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// Built once at startup and read-only afterwards.
///
/// # Examples
///
/// ```no_run
/// use stealchain::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     listen_addr: "127.0.0.1:8443".to_string(),
///     verify: true,
///     ca_bundle: Some(PathBuf::from("roots.pem")),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind (`host:port` or `:port`)
    pub listen_addr: String,

    /// Require and cryptographically verify a client chain
    pub verify: bool,

    /// Alternate trust bundle
    pub ca_bundle: Option<PathBuf>,

    /// Server certificate chain (PEM)
    pub cert: Option<PathBuf>,

    /// Server private key (PEM)
    pub key: Option<PathBuf>,

    /// Directory that receives artifacts
    pub output_dir: PathBuf,

    /// Handshake timeout in seconds, 0 for none
    pub handshake_timeout_seconds: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            verify: false,
            ca_bundle: None,
            cert: None,
            key: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            handshake_timeout_seconds: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            listen_addr: opt.listen,
            verify: opt.verify,
            ca_bundle: if opt.ca.is_empty() {
                None
            } else {
                Some(PathBuf::from(opt.ca))
            },
            cert: opt.cert,
            key: opt.key,
            output_dir: opt.output_dir,
            handshake_timeout_seconds: opt.handshake_timeout_seconds,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}

impl Config {
    /// Checks the configuration for values that can never start a listener.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the listen address is malformed or only one
    /// of `cert`/`key` is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_listen_addr(&self.listen_addr)?;
        if self.cert.is_some() != self.key.is_some() {
            return Err(ConfigError::IncompleteIdentity);
        }
        Ok(())
    }

    /// The handshake bound, if one was configured.
    pub fn handshake_timeout(&self) -> Option<Duration> {
        match self.handshake_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Normalizes a listen address into a bindable `host:port` string.
///
/// An empty host (`:443`) binds all IPv4 interfaces. Host names are left for
/// the resolver at bind time.
///
/// # Errors
///
/// Returns `ConfigError::InvalidListenAddr` when no numeric port is present.
pub fn parse_listen_addr(addr: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidListenAddr(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    port.parse::<u16>().map_err(|_| invalid())?;
    if host.is_empty() {
        Ok(format!("{UNSPECIFIED_HOST}:{port}"))
    } else {
        Ok(addr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr, ":443");
        assert!(!config.verify);
        assert!(config.ca_bundle.is_none());
        assert!(config.handshake_timeout().is_none());
    }

    #[test]
    fn test_parse_listen_addr_empty_host() {
        assert_eq!(parse_listen_addr(":443").unwrap(), "0.0.0.0:443");
        assert_eq!(parse_listen_addr(":0").unwrap(), "0.0.0.0:0");
    }

    #[test]
    fn test_parse_listen_addr_keeps_host() {
        assert_eq!(
            parse_listen_addr("127.0.0.1:8443").unwrap(),
            "127.0.0.1:8443"
        );
        assert_eq!(parse_listen_addr("[::1]:8443").unwrap(), "[::1]:8443");
        assert_eq!(
            parse_listen_addr("localhost:8443").unwrap(),
            "localhost:8443"
        );
    }

    #[test]
    fn test_parse_listen_addr_rejects_missing_port() {
        assert!(parse_listen_addr("localhost").is_err());
        assert!(parse_listen_addr("localhost:").is_err());
        assert!(parse_listen_addr("localhost:https").is_err());
        assert!(parse_listen_addr(":70000").is_err());
    }

    #[test]
    fn test_validate_rejects_half_identity() {
        let config = Config {
            cert: Some(PathBuf::from("server.pem")),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::IncompleteIdentity));

        let config = Config {
            key: Some(PathBuf::from("server.key")),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::IncompleteIdentity));
    }

    #[test]
    fn test_empty_ca_flag_disables_override() {
        let opt = Opt::try_parse_from(["stealchain-server", "--ca", ""]).unwrap();
        assert!(Config::from(opt).ca_bundle.is_none());

        let opt = Opt::try_parse_from(["stealchain-server", "--ca", "roots.pem"]).unwrap();
        assert_eq!(
            Config::from(opt).ca_bundle,
            Some(PathBuf::from("roots.pem"))
        );
    }

    #[test]
    fn test_handshake_timeout_conversion() {
        let config = Config {
            handshake_timeout_seconds: 7,
            ..Default::default()
        };
        assert_eq!(config.handshake_timeout(), Some(Duration::from_secs(7)));
    }
}
