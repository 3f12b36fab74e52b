//! Cryptographic core of the Palisade key store.
//!
//! This crate provides:
//! - Ed25519 keypairs with namespace-tagged address derivation
//! - The passphrase-encrypted keyfile codec (scrypt/PBKDF2 + AES-128-CTR +
//!   SHA-256 MAC, version-3 JSON envelope)
//! - The keystore directory manager: a catalog of keyfiles with
//!   open/create/unlock/lock/delete/update operations
//! - Secure memory wrappers for secrets
//!
//! The crate never logs, prints, or prompts; passphrases are threaded in
//! explicitly and every fallible operation returns a typed error.

pub mod ed25519;
pub mod error;
pub mod key;
pub mod keyfile;
pub mod keystore;
pub mod secure;

// Signature-scheme exports
pub use ed25519::{Ed25519PublicKey, Ed25519SecretKey, Ed25519Signature, SEED_LENGTH};

// Key entity exports
pub use key::Key;

// Keyfile codec exports
pub use keyfile::{
    decode, encode, inspect, CipherKind, KdfConfig, KdfParams, KeyFile, KeyfileError,
    KeyfileInfo, KeyfileResult, KEYFILE_VERSION,
};

// Keystore manager exports
pub use keystore::{KeySelector, Keystore, KeystoreError, KeystoreResult, RecordInfo};

// Error exports
pub use error::CryptoError;

// Secure memory exports
pub use secure::{ExposeSecret, SecretArray, SecretBytes, SecretString};
