//! Core types for the Palisade key store.
//!
//! This crate provides the foundational identity types shared across the
//! Palisade workspace: the 20-byte account/validator address and the
//! namespace tag mixed into address derivation.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod address;
pub mod namespace;

pub use address::{Address, AddressError, ADDRESS_LENGTH};
pub use namespace::{Namespace, NamespaceError};
