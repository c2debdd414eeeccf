//! Reference data enumerations

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{StaticClass, StaticValues};

/// Currencies an account may be held in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyClass {
    Gbp,
    Usd,
    Eur,
    Jpy,
    Chf,
    Cad,
    Aud,
}

impl StaticClass for CurrencyClass {
    const ITEM_TYPE: &'static str = "Currency";
    const LIST_NAME: &'static str = "Currencies";

    fn all() -> &'static [Self] {
        &[
            Self::Gbp,
            Self::Usd,
            Self::Eur,
            Self::Jpy,
            Self::Chf,
            Self::Cad,
            Self::Aud,
        ]
    }

    fn class_id(self) -> u32 {
        match self {
            Self::Gbp => 1,
            Self::Usd => 2,
            Self::Eur => 3,
            Self::Jpy => 4,
            Self::Chf => 5,
            Self::Cad => 6,
            Self::Aud => 7,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Gbp => "GBP",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Jpy => "JPY",
            Self::Chf => "CHF",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
        }
    }
}

/// Category of a financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategoryClass {
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
    LineOfCredit,
    Other,
}

impl StaticClass for AccountCategoryClass {
    const ITEM_TYPE: &'static str = "AccountCategory";
    const LIST_NAME: &'static str = "AccountCategories";

    fn all() -> &'static [Self] {
        &[
            Self::Checking,
            Self::Savings,
            Self::Credit,
            Self::Cash,
            Self::Investment,
            Self::LineOfCredit,
            Self::Other,
        ]
    }

    fn class_id(self) -> u32 {
        match self {
            Self::Checking => 1,
            Self::Savings => 2,
            Self::Credit => 3,
            Self::Cash => 4,
            Self::Investment => 5,
            Self::LineOfCredit => 6,
            Self::Other => 7,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::Credit => "Credit Card",
            Self::Cash => "Cash",
            Self::Investment => "Investment",
            Self::LineOfCredit => "Line of Credit",
            Self::Other => "Other",
        }
    }
}

/// Optional attributes a transaction may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionInfoClass {
    Reference,
    Comments,
    TaxCredit,
    Withheld,
    Partner,
}

impl StaticClass for TransactionInfoClass {
    const ITEM_TYPE: &'static str = "TransactionInfoType";
    const LIST_NAME: &'static str = "TransactionInfoTypes";

    fn all() -> &'static [Self] {
        &[
            Self::Reference,
            Self::Comments,
            Self::TaxCredit,
            Self::Withheld,
            Self::Partner,
        ]
    }

    fn class_id(self) -> u32 {
        match self {
            Self::Reference => 1,
            Self::Comments => 2,
            Self::TaxCredit => 3,
            Self::Withheld => 4,
            Self::Partner => 5,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Reference => "Reference",
            Self::Comments => "Comments",
            Self::TaxCredit => "TaxCredit",
            Self::Withheld => "Withheld",
            Self::Partner => "Partner",
        }
    }
}

macro_rules! display_by_name {
    ($($class:ty),*) => {
        $(
            impl fmt::Display for $class {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }
        )*
    };
}

display_by_name!(CurrencyClass, AccountCategoryClass, TransactionInfoClass);

pub type Currency = StaticValues<CurrencyClass>;
pub type AccountCategory = StaticValues<AccountCategoryClass>;
pub type TransactionInfoType = StaticValues<TransactionInfoClass>;
