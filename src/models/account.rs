//! Account model
//!
//! A financial account (checking, savings, credit card, ...). The name and
//! notes are stored encrypted.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::static_types::{AccountCategoryClass, CurrencyClass};
use crate::crypto::DerivedKey;
use crate::data::{
    DataItem, DataList, DataValues, FieldDef, FieldKind, FieldValue, StaticClass, ValidationErrors,
    NAME_LEN,
};
use crate::error::{DataErrorKind, MoneyWiseResult};
use crate::security::{EncryptedField, EncryptedValues};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: EncryptedField<String>,
    /// Link to an AccountCategory item
    pub category: u32,
    /// Link to a Currency item
    pub currency: u32,
    #[serde(default)]
    pub notes: EncryptedField<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub control_key: u32,
}

impl Account {
    pub fn new(name: impl Into<String>, category: AccountCategoryClass, currency: CurrencyClass) -> Self {
        Self {
            name: EncryptedField::new(name.into()),
            category: category.class_id(),
            currency: currency.class_id(),
            notes: EncryptedField::default(),
            closed: false,
            control_key: 0,
        }
    }

    /// Plaintext name, if unlocked
    pub fn name(&self) -> Option<&str> {
        self.name.value().map(String::as_str)
    }
}

const ACCOUNT_FIELDS: &[FieldDef] = &[
    FieldDef::new("Name", FieldKind::Text),
    FieldDef::new("Category", FieldKind::Link(AccountCategoryClass::ITEM_TYPE)),
    FieldDef::new("Currency", FieldKind::Link(CurrencyClass::ITEM_TYPE)),
    FieldDef::new("Notes", FieldKind::Text),
    FieldDef::new("Closed", FieldKind::Flag),
    FieldDef::ignored("ControlKey", FieldKind::Link("ControlKey")),
];

impl DataValues for Account {
    const ITEM_TYPE: &'static str = "Account";
    const LIST_NAME: &'static str = "Accounts";
    const ENCRYPTED: bool = true;

    fn fields() -> &'static [FieldDef] {
        ACCOUNT_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => self.name.field_value(|v| FieldValue::Text(v.clone())),
            1 => FieldValue::link(self.category),
            2 => FieldValue::link(self.currency),
            3 => self.notes.field_value(|v| FieldValue::Text(v.clone())),
            4 => FieldValue::Flag(self.closed),
            5 => FieldValue::link(self.control_key),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.name().cmp(&other.name())
    }

    fn validate(item: &DataItem<Self>, list: &DataList<Self>, errors: &mut ValidationErrors) {
        let values = item.values();

        match values.name() {
            None if values.name.is_locked() => {}
            None | Some("") => errors.add_error("Name", DataErrorKind::Missing, "Name is required"),
            Some(name) if name.chars().count() > NAME_LEN => errors.add_error(
                "Name",
                DataErrorKind::LengthExceeded,
                format!("Name exceeds {} characters", NAME_LEN),
            ),
            Some(name) => {
                let count = list
                    .live_items()
                    .filter(|other| other.values().name() == Some(name))
                    .count();
                if count > 1 {
                    errors.add_error(
                        "Name",
                        DataErrorKind::DuplicateValue,
                        format!("Duplicate account name '{}'", name),
                    );
                }
            }
        }

        if values.category == 0 {
            errors.add_error("Category", DataErrorKind::Missing, "Category is required");
        }
        if values.currency == 0 {
            errors.add_error("Currency", DataErrorKind::Missing, "Currency is required");
        }
    }

    fn apply_changes(&mut self, other: &Self) -> bool {
        if self.name != other.name {
            self.name = other.name.clone();
        }
        if self.notes != other.notes {
            self.notes = other.notes.clone();
        }
        self.category = other.category;
        self.currency = other.currency;
        self.closed = other.closed;
        true
    }

    fn encrypted(&self) -> Option<&dyn EncryptedValues> {
        Some(self)
    }

    fn encrypted_mut(&mut self) -> Option<&mut dyn EncryptedValues> {
        Some(self)
    }
}

impl EncryptedValues for Account {
    fn control_key(&self) -> u32 {
        self.control_key
    }

    fn set_control_key(&mut self, control_key: u32) {
        self.control_key = control_key;
    }

    fn encrypt_fields(&mut self, key: &DerivedKey, force: bool) -> MoneyWiseResult<()> {
        self.name.encrypt(key, "Account.Name", force)?;
        self.notes.encrypt(key, "Account.Notes", force)
    }

    fn decrypt_fields(&mut self, key: &DerivedKey) -> MoneyWiseResult<()> {
        self.name.decrypt(key, "Account.Name")?;
        self.notes.decrypt(key, "Account.Notes")
    }

    fn is_locked(&self) -> bool {
        self.name.is_locked() || self.notes.is_locked()
    }
}
