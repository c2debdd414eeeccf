//! Change reporting
//!
//! Summarises the changed items of lists and data sets as table rows.

pub mod diff;

use tabled::Tabled;

use crate::data::{DataItem, DataSet, DataState, DataValues};

pub use diff::{describe_values, generate_diff};

/// One changed item, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ChangeRow {
    #[tabled(rename = "List")]
    pub list: String,
    #[tabled(rename = "Id")]
    pub id: u32,
    #[tabled(rename = "State")]
    pub state: DataState,
    #[tabled(rename = "Changes")]
    pub summary: String,
}

/// Summarise how an item differs from its original values
pub fn summarize_item<V: DataValues>(item: &DataItem<V>) -> String {
    match item.state() {
        DataState::New => {
            let values: Vec<_> = V::fields()
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name, item.field_value(i)))
                .collect();
            describe_values(&values)
        }
        DataState::Deleted | DataState::DelNew => "(deleted)".to_string(),
        DataState::Recovered => {
            generate_diff(&item.changed_fields()).unwrap_or_else(|| "(restored)".to_string())
        }
        DataState::Changed => generate_diff(&item.changed_fields()).unwrap_or_default(),
        DataState::Clean | DataState::NoState => String::new(),
    }
}

/// Rows for every changed item of every list in the set
pub fn describe_differences(set: &DataSet) -> Vec<ChangeRow> {
    set.lists().flat_map(|list| list.change_rows()).collect()
}
