//! Optional transaction attributes (reference, comments, tax credit, ...)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::static_types::TransactionInfoClass;
use super::transaction::Transaction;
use crate::crypto::DerivedKey;
use crate::data::{
    DataItem, DataList, DataValues, FieldDef, FieldKind, FieldValue, InfoValues, StaticClass,
    ValidationErrors, DESC_LEN,
};
use crate::error::{DataErrorKind, MoneyWiseResult};
use crate::security::{EncryptedField, EncryptedValues};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// Link to the owning Transaction
    pub owner: u32,
    /// Link to a TransactionInfoType item
    pub info_type: u32,
    pub class: TransactionInfoClass,
    pub value: EncryptedField<String>,
    #[serde(default)]
    pub control_key: u32,
}

const INFO_FIELDS: &[FieldDef] = &[
    FieldDef::new("Owner", FieldKind::Link(Transaction::ITEM_TYPE)),
    FieldDef::new("InfoType", FieldKind::Link(TransactionInfoClass::ITEM_TYPE)),
    FieldDef::new("Class", FieldKind::Integer),
    FieldDef::new("Value", FieldKind::Text),
    FieldDef::ignored("ControlKey", FieldKind::Link("ControlKey")),
];

impl DataValues for TransactionInfo {
    const ITEM_TYPE: &'static str = "TransactionInfo";
    const LIST_NAME: &'static str = "TransactionInfo";
    const ENCRYPTED: bool = true;

    fn fields() -> &'static [FieldDef] {
        INFO_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::link(self.owner),
            1 => FieldValue::link(self.info_type),
            2 => FieldValue::Integer(i64::from(self.class.class_id())),
            3 => self.value.field_value(|v| FieldValue::Text(v.clone())),
            4 => FieldValue::link(self.control_key),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.owner
            .cmp(&other.owner)
            .then(self.class.cmp(&other.class))
    }

    fn validate(item: &DataItem<Self>, list: &DataList<Self>, errors: &mut ValidationErrors) {
        let values = item.values();

        if values.owner == 0 {
            errors.add_error("Owner", DataErrorKind::Missing, "Owner is required");
        }

        let duplicates = list
            .live_items()
            .filter(|other| other.values().owner == values.owner && other.values().class == values.class)
            .count();
        if duplicates > 1 {
            errors.add_error(
                "Class",
                DataErrorKind::DuplicateInfoType,
                format!("Duplicate {} for transaction {}", values.class, values.owner),
            );
        }

        if values.value.value().is_some_and(|v| v.chars().count() > DESC_LEN) {
            errors.add_error(
                "Value",
                DataErrorKind::LengthExceeded,
                format!("Value exceeds {} characters", DESC_LEN),
            );
        }
    }

    fn encrypted(&self) -> Option<&dyn EncryptedValues> {
        Some(self)
    }

    fn encrypted_mut(&mut self) -> Option<&mut dyn EncryptedValues> {
        Some(self)
    }
}

impl InfoValues for TransactionInfo {
    const OWNER_TYPE: &'static str = Transaction::ITEM_TYPE;

    type Class = TransactionInfoClass;
    type Value = String;

    fn new_info(owner: u32, info_type: u32, class: TransactionInfoClass, value: String) -> Self {
        Self {
            owner,
            info_type,
            class,
            value: EncryptedField::new(value),
            control_key: 0,
        }
    }

    fn owner(&self) -> u32 {
        self.owner
    }

    fn set_owner(&mut self, owner: u32) {
        self.owner = owner;
    }

    fn info_class(&self) -> TransactionInfoClass {
        self.class
    }

    fn value(&self) -> Option<&String> {
        self.value.value()
    }

    fn set_value(&mut self, value: String) {
        self.value.set(Some(value));
    }
}

impl EncryptedValues for TransactionInfo {
    fn control_key(&self) -> u32 {
        self.control_key
    }

    fn set_control_key(&mut self, control_key: u32) {
        self.control_key = control_key;
    }

    fn encrypt_fields(&mut self, key: &DerivedKey, force: bool) -> MoneyWiseResult<()> {
        self.value.encrypt(key, "TransactionInfo.Value", force)
    }

    fn decrypt_fields(&mut self, key: &DerivedKey) -> MoneyWiseResult<()> {
        self.value.decrypt(key, "TransactionInfo.Value")
    }

    fn is_locked(&self) -> bool {
        self.value.is_locked()
    }
}
