//! Serialised form of a data set
//!
//! A snapshot stores every list as `(id, values, deleted)` rows. Loading
//! goes through `add_values_item`, so restored items start Clean at
//! version 0.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::file_io::{read_json_required, write_json_atomic};
use crate::data::{DataSet, EditState, TaskControl};
use crate::error::{MoneyWiseError, MoneyWiseResult};

/// One stored row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: u32,
    pub values: serde_json::Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub item_type: String,
    pub items: Vec<StoredItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSetSnapshot {
    pub saved_at: DateTime<Utc>,
    pub generation: u32,
    pub lists: Vec<ListSnapshot>,
}

impl DataSetSnapshot {
    /// Drop soft-deleted rows, as a save purges them
    pub fn drop_deleted(&mut self) {
        for list in &mut self.lists {
            list.items.retain(|item| !item.deleted);
        }
    }

    pub fn item_count(&self) -> usize {
        self.lists.iter().map(|list| list.items.len()).sum()
    }
}

/// Validate, encrypt and write a data set, then commit its changes
pub fn save_data_set(set: &mut DataSet, path: &Path) -> MoneyWiseResult<()> {
    if set.validate() == EditState::Error {
        return Err(MoneyWiseError::Storage(
            "Data set has validation errors and cannot be saved".to_string(),
        ));
    }
    set.seal()?;

    let mut snapshot = set.to_snapshot()?;
    snapshot.drop_deleted();
    write_json_atomic(path, &snapshot)?;
    set.commit();

    info!(
        path = %path.display(),
        items = snapshot.item_count(),
        "Saved data set"
    );
    Ok(())
}

/// Read a data set, unlock it and repair any half-finished key renewal
pub fn load_data_set(
    path: &Path,
    passphrase: &str,
    task: &mut dyn TaskControl,
) -> MoneyWiseResult<DataSet> {
    let snapshot: DataSetSnapshot = read_json_required(path)?;
    let mut set = task.new_data_set();
    set.load_snapshot(&snapshot)?;
    set.unlock_security(passphrase)?;
    if set.check_security(task)? {
        info!(path = %path.display(), "Repaired security records");
    }
    set.validate();
    Ok(set)
}

/// Read a data set without unlocking it
///
/// Encrypted values stay locked, which is enough to compare two files.
pub fn read_data_set(path: &Path, task: &dyn TaskControl) -> MoneyWiseResult<DataSet> {
    let snapshot: DataSetSnapshot = read_json_required(path)?;
    let mut set = task.new_data_set();
    set.load_snapshot(&snapshot)?;
    Ok(set)
}
