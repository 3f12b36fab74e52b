//! Integrity check over keyfile ciphertext.
//!
//! The MAC is computed over `derived_key[16..32] || ciphertext`, binding the
//! ciphertext to the passphrase-derived key. The MAC key is disjoint from
//! the cipher key (the first 16 bytes), so neither value is useful for
//! forging the other.

use sha2::{Digest, Sha256};

use super::error::{KeyfileError, KeyfileResult};
use super::kdf::DKLEN;

/// MAC output length in bytes (SHA-256).
pub const MAC_LENGTH: usize = 32;

/// Compute the MAC over `derived_key[16..32] || ciphertext`.
pub fn compute_mac(derived_key: &[u8], ciphertext: &[u8]) -> KeyfileResult<[u8; MAC_LENGTH]> {
    if derived_key.len() < DKLEN {
        return Err(KeyfileError::InvalidFormat(format!(
            "derived key must be at least {} bytes, got {}",
            DKLEN,
            derived_key.len()
        )));
    }

    let mut hasher = Sha256::new();
    hasher.update(&derived_key[16..32]);
    hasher.update(ciphertext);
    Ok(hasher.finalize().into())
}

/// Recompute the MAC and compare against the stored value.
///
/// A mismatch is reported as [`KeyfileError::AuthenticationFailure`] whether
/// it was caused by a wrong passphrase or by tampered ciphertext; the two are
/// deliberately indistinguishable.
pub fn verify_mac(derived_key: &[u8], ciphertext: &[u8], expected: &[u8]) -> KeyfileResult<()> {
    let computed = compute_mac(derived_key, ciphertext)?;

    if constant_time_eq(&computed, expected) {
        Ok(())
    } else {
        Err(KeyfileError::AuthenticationFailure)
    }
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
