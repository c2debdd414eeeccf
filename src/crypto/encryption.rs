//! AES-256-GCM encryption of field values
//!
//! Every ciphertext is bound to a context string (the field it belongs to)
//! as associated data, so a value cannot be swapped into another field.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::DerivedKey;
use crate::error::{MoneyWiseError, MoneyWiseResult};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

const FORMAT_VERSION: u8 = 1;

/// Ciphertext with its nonce, both base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub nonce: String,
    pub ciphertext: String,
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    FORMAT_VERSION
}

impl EncryptedData {
    fn new(nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
            version: FORMAT_VERSION,
        }
    }

    fn decode(field: &str, encoded: &str) -> MoneyWiseResult<Vec<u8>> {
        STANDARD
            .decode(encoded)
            .map_err(|e| MoneyWiseError::Encryption(format!("Invalid {} encoding: {}", field, e)))
    }

    /// Nonce followed by ciphertext, as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = STANDARD.decode(&self.nonce).unwrap_or_default();
        bytes.extend(STANDARD.decode(&self.ciphertext).unwrap_or_default());
        bytes
    }
}

fn cipher(key: &DerivedKey) -> MoneyWiseResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| MoneyWiseError::Encryption(format!("Failed to create cipher: {}", e)))
}

/// Encrypt `plaintext` under `key`, bound to `context`
pub fn encrypt(plaintext: &[u8], key: &DerivedKey, context: &[u8]) -> MoneyWiseResult<EncryptedData> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let payload = Payload {
        msg: plaintext,
        aad: context,
    };
    let ciphertext = cipher(key)?
        .encrypt(Nonce::from_slice(&nonce_bytes), payload)
        .map_err(|e| MoneyWiseError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedData::new(&nonce_bytes, &ciphertext))
}

/// Decrypt data produced by [`encrypt`] with the same key and context
pub fn decrypt(encrypted: &EncryptedData, key: &DerivedKey, context: &[u8]) -> MoneyWiseResult<Vec<u8>> {
    if encrypted.version != FORMAT_VERSION {
        return Err(MoneyWiseError::Encryption(format!(
            "Unsupported encryption version: {}",
            encrypted.version
        )));
    }

    let nonce_bytes = EncryptedData::decode("nonce", &encrypted.nonce)?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(MoneyWiseError::Encryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let ciphertext = EncryptedData::decode("ciphertext", &encrypted.ciphertext)?;

    let payload = Payload {
        msg: ciphertext.as_ref(),
        aad: context,
    };
    cipher(key)?
        .decrypt(Nonce::from_slice(&nonce_bytes), payload)
        .map_err(|_| {
            MoneyWiseError::Encryption("Decryption failed: invalid key or corrupted data".into())
        })
}

/// Serialize a value to JSON and encrypt it
pub fn seal_value<T: Serialize>(
    value: &T,
    key: &DerivedKey,
    context: &str,
) -> MoneyWiseResult<EncryptedData> {
    let plaintext = zeroize::Zeroizing::new(serde_json::to_vec(value)?);
    encrypt(&plaintext, key, context.as_bytes())
}

/// Decrypt a value sealed with [`seal_value`]
pub fn open_value<T: DeserializeOwned>(
    encrypted: &EncryptedData,
    key: &DerivedKey,
    context: &str,
) -> MoneyWiseResult<T> {
    let plaintext = zeroize::Zeroizing::new(decrypt(encrypted, key, context.as_bytes())?);
    Ok(serde_json::from_slice(&plaintext)?)
}
