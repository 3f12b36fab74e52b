//! Crypto error types

use thiserror::Error;

/// Errors from signature-scheme primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Public key bytes do not encode a valid curve point.
    #[error("invalid public key")]
    InvalidPublicKey,
}
