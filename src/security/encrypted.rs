//! Field-level encryption capability

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::crypto::{open_value, seal_value, DerivedKey, EncryptedData};
use crate::data::FieldValue;
use crate::error::{MoneyWiseError, MoneyWiseResult};

/// Implemented by entity values that hold encrypted fields
pub trait EncryptedValues {
    /// Id of the control key the fields are encrypted under (0 if unassigned)
    fn control_key(&self) -> u32;

    fn set_control_key(&mut self, control_key: u32);

    /// Encrypt fields without ciphertext, or every field when `force` is set
    fn encrypt_fields(&mut self, key: &DerivedKey, force: bool) -> MoneyWiseResult<()>;

    /// Restore plaintext for fields that only hold ciphertext
    fn decrypt_fields(&mut self, key: &DerivedKey) -> MoneyWiseResult<()>;

    /// Whether any field is still waiting to be decrypted
    fn is_locked(&self) -> bool;
}

/// A value stored encrypted
///
/// Holds the plaintext (when unlocked) and the ciphertext (once sealed).
/// Only the ciphertext is serialized. Equality compares plaintext.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
pub struct EncryptedField<T> {
    #[serde(skip)]
    value: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<EncryptedData>,
}

impl<T> Default for EncryptedField<T> {
    fn default() -> Self {
        Self {
            value: None,
            data: None,
        }
    }
}

impl<T> EncryptedField<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(value),
            data: None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Replace the plaintext, discarding stale ciphertext
    pub fn set(&mut self, value: Option<T>) {
        self.value = value;
        self.data = None;
    }

    pub fn encrypted(&self) -> Option<&EncryptedData> {
        self.data.as_ref()
    }

    /// Ciphertext is present but the plaintext has not been recovered
    pub fn is_locked(&self) -> bool {
        self.value.is_none() && self.data.is_some()
    }

    /// Field value for equality and display; locked fields expose their ciphertext
    pub fn field_value(&self, convert: impl FnOnce(&T) -> FieldValue) -> FieldValue {
        match (&self.value, &self.data) {
            (Some(value), _) => convert(value),
            (None, Some(data)) => FieldValue::Bytes(data.to_bytes()),
            (None, None) => FieldValue::None,
        }
    }
}

impl<T: Serialize + DeserializeOwned> EncryptedField<T> {
    pub fn encrypt(&mut self, key: &DerivedKey, context: &str, force: bool) -> MoneyWiseResult<()> {
        if self.data.is_some() && !force {
            return Ok(());
        }
        match &self.value {
            Some(value) => self.data = Some(seal_value(value, key, context)?),
            None if self.data.is_some() => {
                return Err(MoneyWiseError::Encryption(format!(
                    "Cannot re-encrypt locked field {}",
                    context
                )));
            }
            None => {}
        }
        Ok(())
    }

    pub fn decrypt(&mut self, key: &DerivedKey, context: &str) -> MoneyWiseResult<()> {
        if self.value.is_none() {
            if let Some(data) = &self.data {
                self.value = Some(open_value(data, key, context)?);
            }
        }
        Ok(())
    }
}

impl<T: PartialEq> PartialEq for EncryptedField<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (None, None) => self.data == other.data,
            (a, b) => a == b,
        }
    }
}

impl<T> fmt::Debug for EncryptedField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedField")
            .field("unlocked", &self.value.is_some())
            .field("sealed", &self.data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_then_decrypt_after_load() {
        let key = DerivedKey::generate();
        let mut field = EncryptedField::new("Savings".to_string());
        field.encrypt(&key, "Name", false).unwrap();

        let json = serde_json::to_string(&field).unwrap();
        assert!(!json.contains("Savings"));

        let mut loaded: EncryptedField<String> = serde_json::from_str(&json).unwrap();
        assert!(loaded.is_locked());
        assert!(matches!(
            loaded.field_value(|v| FieldValue::Text(v.clone())),
            FieldValue::Bytes(_)
        ));

        loaded.decrypt(&key, "Name").unwrap();
        assert_eq!(loaded.value().map(String::as_str), Some("Savings"));
        assert_eq!(loaded, field);
    }

    #[test]
    fn test_set_discards_ciphertext() {
        let key = DerivedKey::generate();
        let mut field = EncryptedField::new(5i64);
        field.encrypt(&key, "Amount", false).unwrap();
        let sealed = field.encrypted().cloned();

        field.encrypt(&key, "Amount", false).unwrap();
        assert_eq!(field.encrypted().cloned(), sealed);

        field.set(Some(6));
        assert!(field.encrypted().is_none());
    }

    #[test]
    fn test_force_reencrypts_under_new_key() {
        let old_key = DerivedKey::generate();
        let new_key = DerivedKey::generate();
        let mut field = EncryptedField::new("x".to_string());
        field.encrypt(&old_key, "Notes", false).unwrap();
        field.encrypt(&new_key, "Notes", true).unwrap();

        let mut loaded: EncryptedField<String> =
            serde_json::from_str(&serde_json::to_string(&field).unwrap()).unwrap();
        assert!(loaded.decrypt(&old_key, "Notes").is_err());
        loaded.decrypt(&new_key, "Notes").unwrap();
        assert_eq!(loaded.value().map(String::as_str), Some("x"));
    }

    #[test]
    fn test_locked_field_cannot_be_reencrypted() {
        let key = DerivedKey::generate();
        let mut field = EncryptedField::new(1i64);
        field.encrypt(&key, "Amount", false).unwrap();
        let mut loaded: EncryptedField<i64> =
            serde_json::from_str(&serde_json::to_string(&field).unwrap()).unwrap();
        assert!(loaded.encrypt(&key, "Amount", true).is_err());
    }
}
