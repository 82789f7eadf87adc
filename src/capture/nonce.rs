//! Filename nonces.

use std::fmt;

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::config::NONCE_LEN;
use crate::error_handling::CaptureError;

/// 128 random bits that keep artifact names unique.
///
/// Not a secret and not an identifier of anything; it only separates two
/// captures from the same remote address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Draws a fresh nonce from the operating system's random source.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Nonce` if the OS source fails.
    pub fn generate() -> Result<Self, CaptureError> {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CaptureError::Nonce(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; NONCE_LEN]> for Nonce {
    fn from(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }
}

/// Lowercase hex, 32 characters.
impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
