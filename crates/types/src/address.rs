//! 20-byte addresses derived from public keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::namespace::Namespace;

/// Address length in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// A 20-byte address identifying an account or validator.
///
/// Addresses are a pure function of the public key and the namespace tag:
/// `SHA-256(tag || public_key)[..20]`. The tag keeps account and validator
/// addresses for the same key material disjoint.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Derive the address for a public key under the given namespace.
    pub fn derive(namespace: Namespace, public_key: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.tag());
        hasher.update(public_key);
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Render as lowercase hex without a prefix, the form used in keyfile
    /// names and the envelope `address` field.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let bytes: [u8; ADDRESS_LENGTH] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| AddressError::InvalidLength(b.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors parsing an address from its hex form.
#[derive(Debug, Error)]
pub enum AddressError {
    /// Input is not valid hex.
    #[error("invalid address hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length is not [`ADDRESS_LENGTH`].
    #[error("invalid address length: expected {ADDRESS_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_deterministic() {
        let pubkey = [7u8; 32];
        let a1 = Address::derive(Namespace::Account, &pubkey);
        let a2 = Address::derive(Namespace::Account, &pubkey);
        assert_eq!(a1, a2);
    }

    #[test]
    fn test_namespace_separation() {
        let pubkey = [7u8; 32];
        let account = Address::derive(Namespace::Account, &pubkey);
        let validator = Address::derive(Namespace::Validator, &pubkey);
        assert_ne!(account, validator);
    }

    #[test]
    fn test_different_keys_different_addresses() {
        let a1 = Address::derive(Namespace::Account, &[1u8; 32]);
        let a2 = Address::derive(Namespace::Account, &[2u8; 32]);
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_hex_roundtrip() {
        let addr = Address::derive(Namespace::Validator, &[42u8; 32]);
        let parsed: Address = addr.to_hex().parse().expect("parse");
        assert_eq!(parsed, addr);
        assert_eq!(Address::from_bytes(*addr.as_bytes()), addr);
    }

    #[test]
    fn test_hex_length() {
        let addr = Address::derive(Namespace::Account, &[0u8; 32]);
        assert_eq!(addr.to_hex().len(), ADDRESS_LENGTH * 2);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("zz".repeat(20).parse::<Address>().is_err());
        assert!("abcd".parse::<Address>().is_err());
    }

    #[test]
    fn test_serde_hex_string() {
        let addr = Address::derive(Namespace::Account, &[9u8; 32]);
        let json = serde_json::to_string(&addr).expect("serialize");
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));

        let restored: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, addr);
    }
}
