//! Versioned, validated in-memory lists of data items
//!
//! The building blocks, leaves first:
//!
//! - `values` / `history`: the typed values of an item and their snapshots
//! - `identity`: unique ids within a list
//! - `item`: one versioned record and its state machine
//! - `list`: an id-indexed collection with bulk operations
//! - `info_set`: optional per-owner attributes
//! - `static_data`: enumerated reference lists
//! - `dataset`: every list of a data set, plus the security lifecycle

pub mod dataset;
pub mod field;
pub mod history;
pub mod identity;
pub mod info_set;
pub mod item;
pub mod list;
pub mod list_ops;
pub mod state;
pub mod static_data;
pub mod task;
pub mod validation;
pub mod values;

#[cfg(test)]
pub(crate) mod test_support;

pub use dataset::DataSet;
pub use field::{field_index, FieldDef, FieldKind, FieldValue, HASH_PRIME};
pub use history::History;
pub use identity::IdManager;
pub use info_set::{DataInfoSet, InfoValues};
pub use item::{DataItem, RewindOutcome};
pub use list::DataList;
pub use list_ops::{LinkRef, ListOps};
pub use state::{DataState, EditState, ListStyle};
pub use static_data::{StaticClass, StaticValues, DESC_LEN, NAME_LEN};
pub use task::{check_continue, LoggingTask, TaskControl};
pub use validation::{FieldError, ValidationErrors};
pub use values::{DataValues, ValueSet};
