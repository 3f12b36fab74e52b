//! Address namespaces.
//!
//! A keypair can serve two roles on the network: an account that holds funds
//! and signs transactions, or a validator that participates in consensus.
//! The namespace is a fixed domain tag mixed into address derivation so the
//! same key material yields two distinct, non-interchangeable addresses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain tag for account address derivation.
pub const DST_ACCOUNT: &[u8] = b"PALISADE_ACCOUNT_V1";

/// Domain tag for validator address derivation.
pub const DST_VALIDATOR: &[u8] = b"PALISADE_VALIDATOR_V1";

/// Role of a keypair, determining which address it derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Transaction-signing account key.
    Account,
    /// Consensus validator key.
    Validator,
}

impl Namespace {
    /// Domain separation tag prepended to the public key during address
    /// derivation.
    pub fn tag(&self) -> &'static [u8] {
        match self {
            Namespace::Account => DST_ACCOUNT,
            Namespace::Validator => DST_VALIDATOR,
        }
    }

    /// All namespaces, in derivation-probe order.
    pub fn all() -> [Namespace; 2] {
        [Namespace::Account, Namespace::Validator]
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Account => write!(f, "account"),
            Namespace::Validator => write!(f, "validator"),
        }
    }
}

impl FromStr for Namespace {
    type Err = NamespaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "account" => Ok(Namespace::Account),
            "validator" => Ok(Namespace::Validator),
            _ => Err(NamespaceError::Unknown(s.to_string())),
        }
    }
}

/// Errors parsing a namespace name.
#[derive(Debug, Error)]
pub enum NamespaceError {
    /// Name is neither `account` nor `validator`.
    #[error("unknown namespace: {0}. Valid options: account, validator")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_roundtrip() {
        for ns in Namespace::all() {
            let parsed: Namespace = ns.to_string().parse().expect("parse");
            assert_eq!(parsed, ns);
        }
    }

    #[test]
    fn test_namespace_case_insensitive() {
        assert_eq!(
            "Validator".parse::<Namespace>().expect("parse"),
            Namespace::Validator
        );
    }

    #[test]
    fn test_unknown_namespace_fails() {
        assert!("staking".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_tags_differ() {
        assert_ne!(Namespace::Account.tag(), Namespace::Validator.tag());
    }
}
