//! Keyfile error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding a keyfile.
#[derive(Debug, Error)]
pub enum KeyfileError {
    /// File I/O error, surfaced verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed envelope: bad JSON, missing fields, bad hex, or an
    /// unknown version.
    #[error("invalid keyfile: {0}")]
    InvalidFormat(String),

    /// KDF name (or pbkdf2 prf) not recognized.
    #[error("unsupported KDF function: {0}")]
    UnsupportedKdf(String),

    /// Cipher name not recognized.
    #[error("unsupported cipher function: {0}")]
    UnsupportedCipher(String),

    /// MAC verification failed.
    ///
    /// Deliberately carries no detail: a wrong passphrase and tampered
    /// ciphertext are indistinguishable.
    #[error("MAC verification failed")]
    AuthenticationFailure,

    /// The decrypted key does not derive the address recorded in the file.
    #[error("keyfile address {0} does not match the decrypted key")]
    AddressMismatch(String),
}

/// Result type for keyfile operations.
pub type KeyfileResult<T> = Result<T, KeyfileError>;
