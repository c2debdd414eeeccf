//! Money type for currency amounts
//!
//! Amounts are stored in minor units (i64) to avoid floating-point error.
//! The currency itself is carried by the owning account.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::FieldValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create an amount from minor units (e.g. pence, cents)
    pub const fn from_minor(units: i64) -> Self {
        Self(units)
    }

    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn to_field_value(self) -> FieldValue {
        FieldValue::Money(self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}
