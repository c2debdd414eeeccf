//! Passphrase-protected control key

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SecuritySettings;
use crate::crypto::{derive_key, open_value, seal_value, DerivedKey, EncryptedData, KeyDerivationParams};
use crate::data::{DataValues, FieldDef, FieldKind, FieldValue};
use crate::error::{MoneyWiseError, MoneyWiseResult};

const VERIFICATION_TEXT: &str = "moneywise_verify";
const VERIFICATION_CONTEXT: &str = "ControlKey";

/// Derivation parameters and a verification blob for one passphrase key
///
/// The passphrase key itself is never stored: it is re-derived from the
/// passphrase and checked against the verification blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlKey {
    pub key_params: KeyDerivationParams,
    pub verification: EncryptedData,
    pub created_at: DateTime<Utc>,
}

impl ControlKey {
    /// Create a control key for `passphrase`, returning it with the passphrase key
    pub fn create(passphrase: &str, settings: &SecuritySettings) -> MoneyWiseResult<(Self, DerivedKey)> {
        let key_params = KeyDerivationParams::generate(settings);
        let pass_key = derive_key(passphrase, &key_params)?;
        let verification = seal_value(&VERIFICATION_TEXT, &pass_key, VERIFICATION_CONTEXT)?;

        Ok((
            Self {
                key_params,
                verification,
                created_at: Utc::now(),
            },
            pass_key,
        ))
    }

    /// Re-derive the passphrase key, failing if the passphrase is wrong
    pub fn unlock(&self, passphrase: &str) -> MoneyWiseResult<DerivedKey> {
        let pass_key = derive_key(passphrase, &self.key_params)?;
        match open_value::<String>(&self.verification, &pass_key, VERIFICATION_CONTEXT) {
            Ok(text) if text == VERIFICATION_TEXT => Ok(pass_key),
            _ => Err(MoneyWiseError::Encryption("Incorrect passphrase".into())),
        }
    }
}

const CONTROL_KEY_FIELDS: &[FieldDef] = &[
    FieldDef::new("Salt", FieldKind::Text),
    FieldDef::new("Verification", FieldKind::Bytes),
    FieldDef::ignored("Created", FieldKind::Integer),
];

impl DataValues for ControlKey {
    const ITEM_TYPE: &'static str = "ControlKey";
    const LIST_NAME: &'static str = "ControlKeys";

    fn fields() -> &'static [FieldDef] {
        CONTROL_KEY_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Text(self.key_params.salt.clone()),
            1 => FieldValue::Bytes(self.verification.to_bytes()),
            2 => FieldValue::Integer(self.created_at.timestamp()),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> std::cmp::Ordering {
        self.created_at.cmp(&other.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> SecuritySettings {
        SecuritySettings {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_unlock_with_correct_passphrase() {
        let (control, pass_key) = ControlKey::create("hunter2", &light()).unwrap();
        let unlocked = control.unlock("hunter2").unwrap();
        assert_eq!(unlocked.as_bytes(), pass_key.as_bytes());
    }

    #[test]
    fn test_unlock_with_wrong_passphrase_fails() {
        let (control, _) = ControlKey::create("hunter2", &light()).unwrap();
        let err = control.unlock("wrong").unwrap_err();
        assert_eq!(err.to_string(), "Encryption error: Incorrect passphrase");
    }

    #[test]
    fn test_survives_serialization() {
        let (control, _) = ControlKey::create("hunter2", &light()).unwrap();
        let loaded: ControlKey =
            serde_json::from_str(&serde_json::to_string(&control).unwrap()).unwrap();
        assert!(loaded.unlock("hunter2").is_ok());
    }
}
