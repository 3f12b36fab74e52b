//! The in-memory key entity.
//!
//! A [`Key`] bundles a keypair with the address it derives under a chosen
//! namespace. It is the only type that owns decrypted private key material;
//! the seed is zeroized when the Key is dropped. Key is deliberately not
//! `Clone`.

use rand::{CryptoRng, RngCore};

use palisade_types::{Address, Namespace};

use crate::ed25519::{Ed25519PublicKey, Ed25519SecretKey, Ed25519Signature, SEED_LENGTH};

/// A keypair plus its derived address.
pub struct Key {
    address: Address,
    namespace: Namespace,
    public_key: Ed25519PublicKey,
    secret_key: Ed25519SecretKey,
}

impl Key {
    /// Generate a fresh random key under the requested namespace.
    pub fn generate<R: CryptoRng + RngCore>(namespace: Namespace, rng: &mut R) -> Self {
        let secret_key = Ed25519SecretKey::generate(rng);
        Self::from_secret_key(secret_key, namespace)
    }

    /// Wrap an externally supplied seed under the requested namespace.
    ///
    /// No new randomness is consumed; the same seed and namespace always
    /// produce the same address.
    pub fn wrap(seed: [u8; SEED_LENGTH], namespace: Namespace) -> Self {
        Self::from_secret_key(Ed25519SecretKey::from_seed(seed), namespace)
    }

    fn from_secret_key(secret_key: Ed25519SecretKey, namespace: Namespace) -> Self {
        let public_key = secret_key.public_key();
        let address = Address::derive(namespace, &public_key.to_bytes());
        Self {
            address,
            namespace,
            public_key,
            secret_key,
        }
    }

    /// The derived address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The namespace the address was derived under.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The public key.
    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    /// The secret key.
    pub fn secret_key(&self) -> &Ed25519SecretKey {
        &self.secret_key
    }

    /// Sign a message with this key.
    pub fn sign(&self, msg: &[u8]) -> Ed25519Signature {
        self.secret_key.sign(msg)
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key")
            .field("address", &self.address)
            .field("namespace", &self.namespace)
            .field("public_key", &self.public_key)
            .finish()
    }
}
