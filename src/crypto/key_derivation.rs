//! Key derivation using Argon2id
//!
//! Passphrase keys are derived with Argon2id using per-key parameters that
//! are stored alongside the control key. Data keys are random.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;
use argon2::{password_hash::SaltString, Argon2, Params};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::settings::SecuritySettings;
use crate::error::{MoneyWiseError, MoneyWiseResult};

const KEY_SIZE: usize = 32;

/// Parameters a passphrase key was derived with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Salt (base64, no padding)
    pub salt: String,
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl KeyDerivationParams {
    /// Fresh parameters with a random salt
    pub fn generate(settings: &SecuritySettings) -> Self {
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
        Self {
            salt: salt.to_string(),
            memory_cost: settings.memory_cost,
            time_cost: settings.time_cost,
            parallelism: settings.parallelism,
        }
    }
}

/// A 256-bit key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// A random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_slice(bytes: &[u8]) -> MoneyWiseResult<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            MoneyWiseError::Encryption(format!(
                "Invalid key length: expected {}, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { key })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a key from a passphrase
pub fn derive_key(passphrase: &str, params: &KeyDerivationParams) -> MoneyWiseResult<DerivedKey> {
    let salt = SaltString::from_b64(&params.salt)
        .map_err(|e| MoneyWiseError::Encryption(format!("Invalid salt: {}", e)))?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| MoneyWiseError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt.as_str().as_bytes(), &mut key)
        .map_err(|e| MoneyWiseError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}
