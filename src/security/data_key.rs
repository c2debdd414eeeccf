//! Data key wrapped under a passphrase key

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt, DerivedKey, EncryptedData};
use crate::data::{DataItem, DataList, DataValues, FieldDef, FieldKind, FieldValue, ValidationErrors};
use crate::error::{DataErrorKind, MoneyWiseResult};

const WRAP_CONTEXT: &[u8] = b"DataKey";

/// A random data key, encrypted under the passphrase key of its control key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataKey {
    pub control_key: u32,
    pub wrapped: EncryptedData,
}

impl DataKey {
    pub fn wrap(control_key: u32, data_key: &DerivedKey, pass_key: &DerivedKey) -> MoneyWiseResult<Self> {
        Ok(Self {
            control_key,
            wrapped: encrypt(data_key.as_bytes(), pass_key, WRAP_CONTEXT)?,
        })
    }

    pub fn unwrap_key(&self, pass_key: &DerivedKey) -> MoneyWiseResult<DerivedKey> {
        let bytes = Zeroizing::new(decrypt(&self.wrapped, pass_key, WRAP_CONTEXT)?);
        DerivedKey::from_slice(&bytes)
    }
}

const DATA_KEY_FIELDS: &[FieldDef] = &[
    FieldDef::new("ControlKey", FieldKind::Link("ControlKey")),
    FieldDef::new("WrappedKey", FieldKind::Bytes),
];

impl DataValues for DataKey {
    const ITEM_TYPE: &'static str = "DataKey";
    const LIST_NAME: &'static str = "DataKeys";

    fn fields() -> &'static [FieldDef] {
        DATA_KEY_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::link(self.control_key),
            1 => FieldValue::Bytes(self.wrapped.to_bytes()),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> std::cmp::Ordering {
        self.control_key.cmp(&other.control_key)
    }

    fn validate(item: &DataItem<Self>, _list: &DataList<Self>, errors: &mut ValidationErrors) {
        if item.values().control_key == 0 {
            errors.add_error("ControlKey", DataErrorKind::Missing, "Control key is required");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap() {
        let pass_key = DerivedKey::generate();
        let data_key = DerivedKey::generate();
        let wrapped = DataKey::wrap(1, &data_key, &pass_key).unwrap();

        let unwrapped = wrapped.unwrap_key(&pass_key).unwrap();
        assert_eq!(unwrapped.as_bytes(), data_key.as_bytes());
        assert!(wrapped.unwrap_key(&DerivedKey::generate()).is_err());
    }
}
