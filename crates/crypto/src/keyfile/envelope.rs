//! The versioned keyfile envelope.
//!
//! A keyfile is a JSON object persisting one passphrase-encrypted keypair:
//!
//! ```json
//! {
//!   "address": "<hex>",
//!   "version": 3,
//!   "cipher": "aes-128-ctr",
//!   "crypto": {
//!     "cipher": "aes-128-ctr",
//!     "ciphertext": "<hex>",
//!     "cipherparams": { "iv": "<hex>" },
//!     "kdf": "scrypt",
//!     "kdfparams": { "n": ..., "r": ..., "p": ..., "dklen": ..., "salt": "<hex>" },
//!     "mac": "<hex>"
//!   }
//! }
//! ```
//!
//! The address is stored in cleartext so a directory scan can index files
//! without passphrases. The optional `label` field is additive; readers that
//! do not know it ignore it.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use palisade_types::{Address, Namespace};

use super::cipher::{generate_iv, CipherKind, CipherParams, CIPHER_KEY_LENGTH};
use super::error::{KeyfileError, KeyfileResult};
use super::kdf::{generate_salt, KdfConfig, KdfParams};
use super::mac::{compute_mac, verify_mac};
use crate::ed25519::{Ed25519SecretKey, SEED_LENGTH};
use crate::key::Key;
use crate::secure::ExposeSecret;

/// Current keyfile envelope version.
pub const KEYFILE_VERSION: u32 = 3;

/// The on-disk keyfile envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFile {
    /// Address in cleartext, for indexing without decryption.
    pub address: String,
    /// Envelope version.
    pub version: u32,
    /// Cipher name, duplicated at the top level for shape compatibility.
    /// The name inside `crypto` is authoritative.
    pub cipher: String,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Encryption parameters and payload.
    pub crypto: CryptoSection,
}

/// The `crypto` object of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoSection {
    /// Cipher name.
    pub cipher: String,
    /// Encrypted private key as hex.
    pub ciphertext: String,
    /// Cipher parameters.
    pub cipherparams: CipherParams,
    /// KDF name.
    pub kdf: String,
    /// KDF parameters.
    pub kdfparams: KdfParams,
    /// MAC over the derivation output and ciphertext, as hex.
    pub mac: String,
}

/// Cleartext index data recoverable from a keyfile without any derivation
/// work: the cataloging decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyfileInfo {
    /// Address recorded in the envelope.
    pub address: Address,
    /// Label recorded in the envelope, if any.
    pub label: Option<String>,
}

impl KeyFile {
    /// Encrypt a key into a fresh envelope.
    ///
    /// A new random salt and IV are generated on every call; the KDF cost
    /// parameters come from the caller's `kdf` configuration.
    pub fn seal(
        key: &Key,
        passphrase: &str,
        label: Option<&str>,
        kdf: &KdfConfig,
        cipher: CipherKind,
    ) -> KeyfileResult<Self> {
        let salt = generate_salt();
        let iv = generate_iv();

        let kdfparams = kdf.to_params(&salt);
        let derived = kdfparams.derive(passphrase)?;
        let dk = derived.expose_secret();

        let seed = key.secret_key().expose_seed();
        let ciphertext = cipher.transform(&dk[..CIPHER_KEY_LENGTH], &iv, seed)?;
        let mac = compute_mac(dk, &ciphertext)?;

        Ok(Self {
            address: key.address().to_hex(),
            version: KEYFILE_VERSION,
            cipher: cipher.name().to_string(),
            label: label.map(|l| l.to_string()),
            crypto: CryptoSection {
                cipher: cipher.name().to_string(),
                ciphertext: hex::encode(ciphertext),
                cipherparams: CipherParams::new(&iv),
                kdf: kdfparams.function().to_string(),
                kdfparams,
                mac: hex::encode(mac),
            },
        })
    }

    /// Decrypt the envelope and rebuild the key.
    ///
    /// The MAC is verified before the ciphertext is trusted; a wrong
    /// passphrase and a tampered file both surface as
    /// [`KeyfileError::AuthenticationFailure`]. The derived address must
    /// match the recorded one under some namespace, which also recovers the
    /// namespace the key was generated under.
    pub fn unseal(&self, passphrase: &str) -> KeyfileResult<Key> {
        // Resolve names before doing any derivation work.
        let cipher = CipherKind::from_name(&self.crypto.cipher)?;
        self.crypto.kdfparams.check_function(&self.crypto.kdf)?;
        self.crypto.kdfparams.validate()?;

        let ciphertext = hex::decode(&self.crypto.ciphertext)
            .map_err(|e| KeyfileError::InvalidFormat(format!("invalid ciphertext hex: {}", e)))?;
        let stored_mac = hex::decode(&self.crypto.mac)
            .map_err(|e| KeyfileError::InvalidFormat(format!("invalid mac hex: {}", e)))?;
        let iv = self.crypto.cipherparams.iv_bytes()?;

        // Decryption uses the parameters stored in the file, never the
        // caller's current defaults.
        let derived = self.crypto.kdfparams.derive(passphrase)?;
        let dk = derived.expose_secret();

        verify_mac(dk, &ciphertext, &stored_mac)?;

        let plaintext = Zeroizing::new(cipher.transform(
            &dk[..CIPHER_KEY_LENGTH],
            &iv,
            &ciphertext,
        )?);
        let seed: Zeroizing<[u8; SEED_LENGTH]> = Zeroizing::new(
            plaintext.as_slice().try_into().map_err(|_| {
                KeyfileError::InvalidFormat(format!(
                    "decrypted secret must be {} bytes, got {}",
                    SEED_LENGTH,
                    plaintext.len()
                ))
            })?,
        );

        let recorded = self.recorded_address()?;
        let public = Ed25519SecretKey::from_seed(*seed).public_key();
        let namespace = Namespace::all()
            .into_iter()
            .find(|ns| Address::derive(*ns, &public.to_bytes()) == recorded)
            .ok_or_else(|| KeyfileError::AddressMismatch(self.address.clone()))?;

        Ok(Key::wrap(*seed, namespace))
    }

    /// The cataloging decode: address and label only, no derivation work,
    /// never needs a passphrase.
    pub fn info(&self) -> KeyfileResult<KeyfileInfo> {
        Ok(KeyfileInfo {
            address: self.recorded_address()?,
            label: self.label.clone(),
        })
    }

    /// Serialize to the on-disk JSON form.
    pub fn to_bytes(&self) -> KeyfileResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| KeyfileError::InvalidFormat(e.to_string()))
    }

    /// Parse the on-disk JSON form, rejecting unknown versions.
    pub fn from_bytes(bytes: &[u8]) -> KeyfileResult<Self> {
        let keyfile: Self = serde_json::from_slice(bytes)
            .map_err(|e| KeyfileError::InvalidFormat(e.to_string()))?;
        if keyfile.version != KEYFILE_VERSION {
            return Err(KeyfileError::InvalidFormat(format!(
                "unsupported keyfile version {}",
                keyfile.version
            )));
        }
        Ok(keyfile)
    }

    fn recorded_address(&self) -> KeyfileResult<Address> {
        self.address
            .parse()
            .map_err(|e| KeyfileError::InvalidFormat(format!("invalid address field: {}", e)))
    }
}

/// Encrypt `key` into keyfile bytes.
pub fn encode(
    key: &Key,
    passphrase: &str,
    label: Option<&str>,
    kdf: &KdfConfig,
    cipher: CipherKind,
) -> KeyfileResult<Vec<u8>> {
    KeyFile::seal(key, passphrase, label, kdf, cipher)?.to_bytes()
}

/// Decrypt keyfile bytes into the key and its label.
pub fn decode(bytes: &[u8], passphrase: &str) -> KeyfileResult<(Key, Option<String>)> {
    let keyfile = KeyFile::from_bytes(bytes)?;
    let key = keyfile.unseal(passphrase)?;
    Ok((key, keyfile.label))
}

/// The partial decode for cataloging: address and label from the cleartext
/// envelope fields.
pub fn inspect(bytes: &[u8]) -> KeyfileResult<KeyfileInfo> {
    KeyFile::from_bytes(bytes)?.info()
}
