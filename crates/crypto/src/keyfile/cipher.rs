//! Symmetric cipher for keyfile encryption.
//!
//! AES-128-CTR is an XOR stream cipher: the same operation encrypts and
//! decrypts, and the ciphertext has the same length as the plaintext. The
//! cipher key is the first 16 bytes of the KDF output.

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use serde::{Deserialize, Serialize};

use super::error::{KeyfileError, KeyfileResult};

/// IV (initialization vector) length for AES-128-CTR.
pub const IV_LENGTH: usize = 16;

/// AES-128 key length.
pub const CIPHER_KEY_LENGTH: usize = 16;

/// Cipher name for AES-128-CTR.
pub const CIPHER_AES_128_CTR: &str = "aes-128-ctr";

type Aes128Ctr = Ctr128BE<Aes128>;

/// Supported ciphers, selected by the name stored in the keyfile.
///
/// A closed set: new ciphers are added as variants, never as ad hoc string
/// branches in the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CipherKind {
    /// AES-128 in counter mode.
    #[default]
    Aes128Ctr,
}

impl CipherKind {
    /// The name under which this cipher is stored.
    pub fn name(&self) -> &'static str {
        match self {
            CipherKind::Aes128Ctr => CIPHER_AES_128_CTR,
        }
    }

    /// Look up a cipher by its stored name.
    pub fn from_name(name: &str) -> KeyfileResult<Self> {
        match name {
            CIPHER_AES_128_CTR => Ok(CipherKind::Aes128Ctr),
            other => Err(KeyfileError::UnsupportedCipher(other.to_string())),
        }
    }

    /// Apply the keystream to `data`.
    ///
    /// Encrypting and decrypting are the same operation; applying it twice
    /// with the same key and IV returns the original bytes.
    pub fn transform(&self, key: &[u8], iv: &[u8], data: &[u8]) -> KeyfileResult<Vec<u8>> {
        let key: [u8; CIPHER_KEY_LENGTH] = key.try_into().map_err(|_| {
            KeyfileError::InvalidFormat(format!("cipher key must be {} bytes", CIPHER_KEY_LENGTH))
        })?;
        let iv: [u8; IV_LENGTH] = iv.try_into().map_err(|_| {
            KeyfileError::InvalidFormat(format!("IV must be {} bytes", IV_LENGTH))
        })?;

        match self {
            CipherKind::Aes128Ctr => {
                let mut cipher = Aes128Ctr::new(&key.into(), &iv.into());
                let mut output = data.to_vec();
                cipher.apply_keystream(&mut output);
                Ok(output)
            }
        }
    }
}

/// Cipher parameters as stored in a keyfile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CipherParams {
    /// Initialization vector as hex string.
    pub iv: String,
}

impl CipherParams {
    /// Create parameters from raw IV bytes.
    pub fn new(iv: &[u8]) -> Self {
        Self {
            iv: hex::encode(iv),
        }
    }

    /// Decode the IV, checking its length.
    pub fn iv_bytes(&self) -> KeyfileResult<Vec<u8>> {
        let iv = hex::decode(&self.iv)
            .map_err(|e| KeyfileError::InvalidFormat(format!("invalid IV hex: {}", e)))?;
        if iv.len() != IV_LENGTH {
            return Err(KeyfileError::InvalidFormat(format!(
                "IV must be {} bytes, got {}",
                IV_LENGTH,
                iv.len()
            )));
        }
        Ok(iv)
    }
}

/// Generate a random IV.
pub fn generate_iv() -> Vec<u8> {
    use rand::RngCore;
    let mut iv = vec![0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}
