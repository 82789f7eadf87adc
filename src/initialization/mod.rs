//! Process-wide initialization.
//!
//! This module sets up the two global facilities the listener relies on:
//! - The logger (`env_logger` with plain or JSON formatting)
//! - The `rustls` crypto provider
//!
//! Both are safe to call more than once.

mod logger;

use std::sync::Arc;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use logger::init_logger_with;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. This must be called before
/// the server configuration is built.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}

/// Returns the process-wide crypto provider, installing the default one if needed.
pub(crate) fn crypto_provider() -> Arc<CryptoProvider> {
    init_crypto_provider();
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(default_provider()))
}
