//! Secure memory handling for secrets.

mod secret;

pub use secrecy::ExposeSecret;
pub use secret::{SecretArray, SecretBytes, SecretString};
