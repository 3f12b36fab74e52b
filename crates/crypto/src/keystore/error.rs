//! Keystore error types

use thiserror::Error;

use crate::keyfile::KeyfileError;

/// Errors that can occur during keystore operations.
#[derive(Debug, Error)]
pub enum KeystoreError {
    /// File or directory I/O error, surfaced verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the keyfile codec, including authentication failures.
    #[error(transparent)]
    Keyfile(#[from] KeyfileError),

    /// No catalog entry matches the selector.
    #[error("no catalog entry matches {0}")]
    NotFound(String),

    /// A keyfile for this address already exists in the catalog.
    #[error("key already exists: {0}")]
    AlreadyExists(String),

    /// The entry is locked and the operation needs its key.
    #[error("key is locked: {0}")]
    Locked(String),
}

impl KeystoreError {
    /// Whether this error is an authentication failure (wrong passphrase or
    /// tampered keyfile).
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            KeystoreError::Keyfile(KeyfileError::AuthenticationFailure)
        )
    }
}

/// Result type for keystore operations.
pub type KeystoreResult<T> = Result<T, KeystoreError>;
