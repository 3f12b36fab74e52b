//! Ed25519 keypairs for account and validator keys.
//!
//! Addresses are derived from the Ed25519 public key with a namespace tag,
//! see [`palisade_types::Address`]. The secret side holds only the 32-byte
//! seed, in memory that is zeroized on drop; the expanded signing key is
//! reconstructed per operation.

use ed25519_consensus::{
    Signature as Ed25519Sig, SigningKey as Ed25519Signer, VerificationKey as Ed25519Verifier,
};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::secure::SecretArray;

/// Ed25519 seed length in bytes.
pub const SEED_LENGTH: usize = 32;

/// Ed25519 secret key (32-byte seed, zeroized on drop).
pub struct Ed25519SecretKey {
    seed: SecretArray<SEED_LENGTH>,
}

impl Ed25519SecretKey {
    /// Generate a new random secret key.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut seed = [0u8; SEED_LENGTH];
        rng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Create from seed bytes.
    pub fn from_seed(seed: [u8; SEED_LENGTH]) -> Self {
        Self {
            seed: SecretArray::new(seed),
        }
    }

    /// Expose the raw seed.
    ///
    /// # Security
    ///
    /// The returned reference must not outlive a scoped use; callers that
    /// copy it are responsible for zeroizing the copy.
    pub fn expose_seed(&self) -> &[u8; SEED_LENGTH] {
        self.seed.expose_secret()
    }

    /// Get the corresponding public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        let signer = Ed25519Signer::from(*self.seed.expose_secret());
        Ed25519PublicKey(signer.verification_key())
    }

    /// Sign a message.
    pub fn sign(&self, msg: &[u8]) -> Ed25519Signature {
        let signer = Ed25519Signer::from(*self.seed.expose_secret());
        Ed25519Signature(signer.sign(msg))
    }
}

impl std::fmt::Debug for Ed25519SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519SecretKey")
            .field("seed", &"[REDACTED]")
            .finish()
    }
}

/// Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq)]
pub struct Ed25519PublicKey(Ed25519Verifier);

impl Ed25519PublicKey {
    /// Load from bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        Ed25519Verifier::try_from(*bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Serialize to bytes (32 bytes).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Verify a signature.
    pub fn verify(&self, msg: &[u8], sig: &Ed25519Signature) -> bool {
        self.0.verify(&sig.0, msg).is_ok()
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "Ed25519PublicKey({})", hex::encode(&bytes[..8]))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid public key length"))?;
        Self::from_bytes(&arr).map_err(serde::de::Error::custom)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone)]
pub struct Ed25519Signature(Ed25519Sig);

impl Ed25519Signature {
    /// Load from bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(Ed25519Sig::from(*bytes))
    }

    /// Serialize to bytes (64 bytes).
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "Ed25519Signature({})", hex::encode(&bytes[..8]))
    }
}

impl PartialEq for Ed25519Signature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Ed25519Signature {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let secret = Ed25519SecretKey::generate(&mut rand::thread_rng());
        let bytes = secret.public_key().to_bytes();
        let restored = Ed25519PublicKey::from_bytes(&bytes).expect("valid pubkey");
        assert_eq!(secret.public_key().to_bytes(), restored.to_bytes());
    }

    #[test]
    fn test_sign_verify() {
        let secret = Ed25519SecretKey::generate(&mut rand::thread_rng());
        let msg = b"test message";
        let sig = secret.sign(msg);
        assert!(secret.public_key().verify(msg, &sig));
    }

    #[test]
    fn test_wrong_message_fails() {
        let secret = Ed25519SecretKey::generate(&mut rand::thread_rng());
        let sig = secret.sign(b"correct message");
        assert!(!secret.public_key().verify(b"wrong message", &sig));
    }

    #[test]
    fn test_seed_roundtrip() {
        let secret = Ed25519SecretKey::from_seed([42u8; SEED_LENGTH]);
        let again = Ed25519SecretKey::from_seed(*secret.expose_seed());
        assert_eq!(secret.public_key().to_bytes(), again.public_key().to_bytes());
    }

    #[test]
    fn test_public_key_serialization() {
        let secret = Ed25519SecretKey::generate(&mut rand::thread_rng());
        let json = serde_json::to_string(&secret.public_key()).expect("serialize");
        let restored: Ed25519PublicKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(secret.public_key().to_bytes(), restored.to_bytes());
    }

    #[test]
    fn test_debug_output_redacted() {
        let secret = Ed25519SecretKey::from_seed([0xABu8; SEED_LENGTH]);
        let debug = format!("{:?}", secret);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("171"));
    }
}
