//! MoneyWise entities
//!
//! Reference data (currencies, account categories, transaction info
//! types), accounts, transactions and their optional info attributes.

pub mod account;
pub mod money;
pub mod static_types;
pub mod transaction;
pub mod transaction_info;

pub use account::Account;
pub use money::Money;
pub use static_types::{
    AccountCategory, AccountCategoryClass, Currency, CurrencyClass, TransactionInfoClass,
    TransactionInfoType,
};
pub use transaction::{Transaction, TransactionStatus};
pub use transaction_info::TransactionInfo;

use tracing::debug;

use crate::data::{DataSet, ListStyle};
use crate::error::MoneyWiseResult;

/// An empty core data set with every MoneyWise list registered
///
/// Lists are registered so that link targets precede the lists linking
/// to them.
pub fn new_data_set() -> DataSet {
    let mut set = DataSet::new(ListStyle::Core);
    set.register::<Currency>();
    set.register::<AccountCategory>();
    set.register::<TransactionInfoType>();
    set.register::<Account>();
    set.register::<Transaction>();
    set.register_info::<TransactionInfo>();
    set
}

/// Fill the reference lists with their default entries
pub fn populate_static_data(set: &mut DataSet) -> MoneyWiseResult<()> {
    let currencies = set.list_mut::<Currency>()?.populate_defaults()?;
    let categories = set.list_mut::<AccountCategory>()?.populate_defaults()?;
    let info_types = set.list_mut::<TransactionInfoType>()?.populate_defaults()?;
    debug!(currencies, categories, info_types, "Populated static data");
    Ok(())
}
