//! Key derivation functions.
//!
//! Two algorithms are supported, selected by the name stored in the keyfile:
//! scrypt and PBKDF2-HMAC-SHA256. Cost parameters are generation-time
//! choices: a fresh encryption writes the caller's configured parameters with
//! a fresh random salt, while decryption always uses whatever parameters the
//! file being read carries.

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::error::{KeyfileError, KeyfileResult};
use crate::secure::SecretBytes;

/// KDF name for scrypt.
pub const KDF_SCRYPT: &str = "scrypt";

/// KDF name for PBKDF2.
pub const KDF_PBKDF2: &str = "pbkdf2";

/// The only supported PBKDF2 pseudo-random function.
pub const PBKDF2_PRF: &str = "hmac-sha256";

/// Derived key length in bytes. The cipher key is the first half, the MAC
/// key the second, so anything shorter than 32 is unusable.
pub const DKLEN: usize = 32;

/// Salt length written by fresh encryptions.
pub const SALT_LENGTH: usize = 32;

/// Minimum salt length accepted when reading.
pub const MIN_SALT_LENGTH: usize = 16;

/// KDF parameters as stored in a keyfile.
///
/// The variants are a closed set; adding an algorithm means adding a variant
/// here, not string comparisons in the codec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum KdfParams {
    /// scrypt parameters.
    Scrypt {
        /// CPU/memory cost parameter (must be a power of 2).
        n: u32,
        /// Block size parameter.
        r: u32,
        /// Parallelization parameter.
        p: u32,
        /// Derived key length in bytes.
        dklen: u32,
        /// Salt as hex string.
        salt: String,
    },
    /// PBKDF2 parameters.
    Pbkdf2 {
        /// Iteration count.
        c: u32,
        /// Pseudo-random function, fixed to `hmac-sha256`.
        prf: String,
        /// Derived key length in bytes.
        dklen: u32,
        /// Salt as hex string.
        salt: String,
    },
}

impl KdfParams {
    /// The name under which these parameters are stored.
    pub fn function(&self) -> &'static str {
        match self {
            KdfParams::Scrypt { .. } => KDF_SCRYPT,
            KdfParams::Pbkdf2 { .. } => KDF_PBKDF2,
        }
    }

    /// Check that the name stored alongside these parameters selects the
    /// algorithm they describe.
    ///
    /// An unknown name is `UnsupportedKdf`; a known name paired with the
    /// other algorithm's parameters is a malformed file.
    pub fn check_function(&self, name: &str) -> KeyfileResult<()> {
        match name {
            KDF_SCRYPT | KDF_PBKDF2 => {
                if name != self.function() {
                    return Err(KeyfileError::InvalidFormat(format!(
                        "kdf name {} does not match kdfparams",
                        name
                    )));
                }
                if let KdfParams::Pbkdf2 { prf, .. } = self {
                    if prf != PBKDF2_PRF {
                        return Err(KeyfileError::UnsupportedKdf(format!("pbkdf2 prf {}", prf)));
                    }
                }
                Ok(())
            }
            other => Err(KeyfileError::UnsupportedKdf(other.to_string())),
        }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> KeyfileResult<()> {
        let (dklen, salt) = match self {
            KdfParams::Scrypt {
                n, r, p, dklen, salt, ..
            } => {
                if *n < 2 || (*n & (*n - 1)) != 0 {
                    return Err(KeyfileError::InvalidFormat(
                        "scrypt n must be a power of 2 greater than 1".to_string(),
                    ));
                }
                if *r == 0 || *p == 0 {
                    return Err(KeyfileError::InvalidFormat(
                        "scrypt r and p must be positive".to_string(),
                    ));
                }
                (*dklen, salt)
            }
            KdfParams::Pbkdf2 { c, dklen, salt, .. } => {
                if *c == 0 {
                    return Err(KeyfileError::InvalidFormat(
                        "pbkdf2 iteration count must be positive".to_string(),
                    ));
                }
                (*dklen, salt)
            }
        };

        if (dklen as usize) < DKLEN {
            return Err(KeyfileError::InvalidFormat(format!(
                "dklen must be at least {}, got {}",
                DKLEN, dklen
            )));
        }

        let salt_bytes = decode_salt(salt)?;
        if salt_bytes.len() < MIN_SALT_LENGTH {
            return Err(KeyfileError::InvalidFormat(format!(
                "salt must be at least {} bytes, got {}",
                MIN_SALT_LENGTH,
                salt_bytes.len()
            )));
        }

        Ok(())
    }

    /// Derive a key from the given passphrase.
    ///
    /// Deterministic: the same passphrase and parameters always produce the
    /// same output.
    pub fn derive(&self, passphrase: &str) -> KeyfileResult<SecretBytes> {
        match self {
            KdfParams::Scrypt {
                n, r, p, dklen, salt,
            } => {
                let salt = decode_salt(salt)?;
                scrypt_derive(passphrase, &salt, *n, *r, *p, *dklen as usize)
            }
            KdfParams::Pbkdf2 { c, dklen, salt, .. } => {
                let salt = decode_salt(salt)?;
                pbkdf2_derive(passphrase, &salt, *c, *dklen as usize)
            }
        }
    }
}

fn decode_salt(salt: &str) -> KeyfileResult<Vec<u8>> {
    hex::decode(salt).map_err(|e| KeyfileError::InvalidFormat(format!("invalid salt hex: {}", e)))
}

/// Derive a key using scrypt.
fn scrypt_derive(
    passphrase: &str,
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    dklen: usize,
) -> KeyfileResult<SecretBytes> {
    // Power-of-two validation happens in validate(); trailing_zeros is then
    // exactly log2(n).
    let log_n = n.trailing_zeros() as u8;

    let params = scrypt::Params::new(log_n, r, p, dklen)
        .map_err(|e| KeyfileError::InvalidFormat(format!("invalid scrypt parameters: {}", e)))?;

    let mut output = vec![0u8; dklen];
    scrypt::scrypt(passphrase.as_bytes(), salt, &params, &mut output)
        .map_err(|e| KeyfileError::InvalidFormat(format!("scrypt derivation failed: {}", e)))?;

    Ok(SecretBox::new(Box::new(output)))
}

/// Derive a key using PBKDF2-HMAC-SHA256.
fn pbkdf2_derive(
    passphrase: &str,
    salt: &[u8],
    rounds: u32,
    dklen: usize,
) -> KeyfileResult<SecretBytes> {
    let mut output = vec![0u8; dklen];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, rounds, &mut output);
    Ok(SecretBox::new(Box::new(output)))
}

/// Generation-time KDF choice: the algorithm and cost parameters a fresh
/// encryption will write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "kdf")]
pub enum KdfConfig {
    /// Encrypt new files with scrypt.
    Scrypt {
        /// CPU/memory cost parameter.
        n: u32,
        /// Block size parameter.
        r: u32,
        /// Parallelization parameter.
        p: u32,
    },
    /// Encrypt new files with PBKDF2-HMAC-SHA256.
    Pbkdf2 {
        /// Iteration count.
        c: u32,
    },
}

impl KdfConfig {
    /// Standard scrypt parameters: strong brute-force resistance, roughly a
    /// second of derivation time.
    pub fn standard() -> Self {
        KdfConfig::Scrypt {
            n: 262_144, // 2^18
            r: 8,
            p: 1,
        }
    }

    /// Light scrypt parameters for resource-constrained environments.
    pub fn light() -> Self {
        KdfConfig::Scrypt { n: 4096, r: 8, p: 6 }
    }

    /// Standard PBKDF2 parameters.
    pub fn pbkdf2_standard() -> Self {
        KdfConfig::Pbkdf2 { c: 262_144 }
    }

    /// Light PBKDF2 parameters for resource-constrained environments.
    pub fn pbkdf2_light() -> Self {
        KdfConfig::Pbkdf2 { c: 4096 }
    }

    /// Instantiate stored parameters with the given salt.
    pub fn to_params(&self, salt: &[u8]) -> KdfParams {
        match *self {
            KdfConfig::Scrypt { n, r, p } => KdfParams::Scrypt {
                n,
                r,
                p,
                dklen: DKLEN as u32,
                salt: hex::encode(salt),
            },
            KdfConfig::Pbkdf2 { c } => KdfParams::Pbkdf2 {
                c,
                prf: PBKDF2_PRF.to_string(),
                dklen: DKLEN as u32,
                salt: hex::encode(salt),
            },
        }
    }
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Generate a random salt.
pub fn generate_salt() -> Vec<u8> {
    use rand::RngCore;
    let mut salt = vec![0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
