//! Passphrase-encrypted keyfile codec.
//!
//! A keyfile persists one keypair, encrypted under a passphrase:
//!
//! - a KDF (scrypt or PBKDF2-HMAC-SHA256) stretches the passphrase and a
//!   random salt into a 32-byte key,
//! - AES-128-CTR encrypts the private key under the first half,
//! - a SHA-256 MAC over the second half and the ciphertext detects both
//!   wrong passphrases and tampering,
//! - a versioned JSON envelope ties the pieces together.
//!
//! KDF and cipher are each a closed tagged variant selected by a name string
//! in the envelope; unknown names fail loudly instead of falling back.

mod cipher;
mod envelope;
mod error;
mod kdf;
mod mac;

pub use cipher::{generate_iv, CipherKind, CipherParams, CIPHER_KEY_LENGTH, IV_LENGTH};
pub use envelope::{
    decode, encode, inspect, CryptoSection, KeyFile, KeyfileInfo, KEYFILE_VERSION,
};
pub use error::{KeyfileError, KeyfileResult};
pub use kdf::{generate_salt, KdfConfig, KdfParams, DKLEN, SALT_LENGTH};
pub use mac::{compute_mac, verify_mac, MAC_LENGTH};
