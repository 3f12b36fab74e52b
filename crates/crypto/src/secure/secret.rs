//! Secret wrapper utilities for consistent secret handling
//!
//! Provides type aliases and utilities around the `secrecy` crate for
//! handling sensitive strings and byte buffers.

use secrecy::{SecretBox, SecretString as SecrecySecretString};
use zeroize::Zeroize;

/// A secret byte buffer that is zeroized on drop.
///
/// Use this for sensitive binary data like derived keys or decrypted seeds.
/// The inner value can only be accessed via `expose_secret()`.
pub type SecretBytes = SecretBox<Vec<u8>>;

/// A secret string that is zeroized on drop.
///
/// Use this for sensitive text like passphrases.
pub type SecretString = SecrecySecretString;

/// A fixed-size secret byte array.
///
/// Unlike `SecretBytes`, this is for fixed-size secrets like seeds.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecretArray<const N: usize> {
    inner: [u8; N],
}

impl<const N: usize> SecretArray<N> {
    /// Create a new secret array from bytes.
    pub fn new(bytes: [u8; N]) -> Self {
        Self { inner: bytes }
    }

    /// Expose the secret bytes.
    ///
    /// # Security
    ///
    /// Use this sparingly and only when necessary.
    /// The returned reference should not be stored.
    pub fn expose_secret(&self) -> &[u8; N] {
        &self.inner
    }
}

impl<const N: usize> std::fmt::Debug for SecretArray<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretArray")
            .field("length", &N)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

// Clone is intentionally not implemented to prevent accidental copies.

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::{ExposeSecret, SecretBox};

    #[test]
    fn test_secret_string() {
        let secret: SecretString = "my-passphrase".to_string().into();
        let exposed: &str = secret.expose_secret();
        assert_eq!(exposed, "my-passphrase");
    }

    #[test]
    fn test_secret_bytes() {
        let data = vec![1, 2, 3, 4, 5];
        let secret = SecretBox::new(Box::new(data));
        assert_eq!(secret.expose_secret(), &vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_secret_array() {
        let arr = [0xABu8; 32];
        let secret = SecretArray::new(arr);
        assert_eq!(secret.expose_secret(), &arr);
    }

    #[test]
    fn test_secret_array_debug() {
        let arr = [0xABu8; 32];
        let secret = SecretArray::new(arr);
        let debug = format!("{:?}", secret);

        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("length"));
        assert!(!debug.contains("171")); // 0xAB = 171
    }
}
