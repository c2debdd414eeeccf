//! Transaction model
//!
//! A dated movement of money from a debit account to a credit account.
//! The amount is stored encrypted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::account::Account;
use super::money::Money;
use crate::crypto::DerivedKey;
use crate::data::{DataItem, DataList, DataValues, FieldDef, FieldKind, FieldValue, ValidationErrors};
use crate::error::{DataErrorKind, MoneyWiseResult};
use crate::security::{EncryptedField, EncryptedValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Cleared,
    /// Reconciled against a statement
    Reconciled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Cleared => write!(f, "Cleared"),
            Self::Reconciled => write!(f, "Reconciled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Link to the Account money leaves
    pub debit: u32,
    /// Link to the Account money enters
    pub credit: u32,
    pub amount: EncryptedField<Money>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub control_key: u32,
}

impl Transaction {
    pub fn new(date: NaiveDate, debit: u32, credit: u32, amount: Money) -> Self {
        Self {
            date,
            debit,
            credit,
            amount: EncryptedField::new(amount),
            status: TransactionStatus::default(),
            control_key: 0,
        }
    }

    pub fn amount(&self) -> Option<Money> {
        self.amount.value().copied()
    }
}

const TRANSACTION_FIELDS: &[FieldDef] = &[
    FieldDef::new("Date", FieldKind::Date),
    FieldDef::new("Debit", FieldKind::Link(Account::ITEM_TYPE)),
    FieldDef::new("Credit", FieldKind::Link(Account::ITEM_TYPE)),
    FieldDef::new("Amount", FieldKind::Money),
    FieldDef::new("Status", FieldKind::Text),
    FieldDef::ignored("ControlKey", FieldKind::Link("ControlKey")),
];

impl DataValues for Transaction {
    const ITEM_TYPE: &'static str = "Transaction";
    const LIST_NAME: &'static str = "Transactions";
    const ENCRYPTED: bool = true;

    fn fields() -> &'static [FieldDef] {
        TRANSACTION_FIELDS
    }

    fn field_value(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::Date(self.date),
            1 => FieldValue::link(self.debit),
            2 => FieldValue::link(self.credit),
            3 => self.amount.field_value(|m| m.to_field_value()),
            4 => FieldValue::Text(self.status.to_string()),
            5 => FieldValue::link(self.control_key),
            _ => FieldValue::None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }

    fn validate(item: &DataItem<Self>, _list: &DataList<Self>, errors: &mut ValidationErrors) {
        let values = item.values();

        if values.debit == 0 {
            errors.add_error("Debit", DataErrorKind::Missing, "Debit account is required");
        }
        if values.credit == 0 {
            errors.add_error("Credit", DataErrorKind::Missing, "Credit account is required");
        } else if values.credit == values.debit {
            errors.add_error(
                "Credit",
                DataErrorKind::InvalidValue,
                "Debit and credit accounts must differ",
            );
        }

        match values.amount() {
            None if values.amount.is_locked() => {}
            None => errors.add_error("Amount", DataErrorKind::Missing, "Amount is required"),
            Some(amount) if amount.is_negative() => errors.add_error(
                "Amount",
                DataErrorKind::InvalidValue,
                "Amount must not be negative",
            ),
            Some(_) => {}
        }
    }

    fn encrypted(&self) -> Option<&dyn EncryptedValues> {
        Some(self)
    }

    fn encrypted_mut(&mut self) -> Option<&mut dyn EncryptedValues> {
        Some(self)
    }
}

impl EncryptedValues for Transaction {
    fn control_key(&self) -> u32 {
        self.control_key
    }

    fn set_control_key(&mut self, control_key: u32) {
        self.control_key = control_key;
    }

    fn encrypt_fields(&mut self, key: &DerivedKey, force: bool) -> MoneyWiseResult<()> {
        self.amount.encrypt(key, "Transaction.Amount", force)
    }

    fn decrypt_fields(&mut self, key: &DerivedKey) -> MoneyWiseResult<()> {
        self.amount.decrypt(key, "Transaction.Amount")
    }

    fn is_locked(&self) -> bool {
        self.amount.is_locked()
    }
}
