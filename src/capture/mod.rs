//! Chain capture: turning a presented certificate chain into an artifact file.
//!
//! Each artifact is named after the peer's address plus a 128-bit random
//! nonce, so concurrent captures never need to coordinate.

mod artifact;
mod nonce;
mod pem;

// Re-export public API
pub use artifact::CapturedChain;
pub use nonce::Nonce;
pub use pem::{encode_certificate, encode_chain};
