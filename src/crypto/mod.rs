//! Cryptographic primitives for MoneyWise
//!
//! AES-256-GCM authenticated encryption with Argon2id key derivation. The
//! key lifecycle built on top of these lives in [`crate::security`].

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{decrypt, encrypt, open_value, seal_value, EncryptedData};
pub use key_derivation::{derive_key, DerivedKey, KeyDerivationParams};
pub use secure_memory::SecureString;
