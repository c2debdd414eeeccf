//! Storage layer for MoneyWise
//!
//! JSON files written atomically: the settings file and data-set
//! snapshots.

pub mod file_io;
pub mod init;
pub mod snapshot;

pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use init::initialize_storage;
pub use snapshot::{
    load_data_set, read_data_set, save_data_set, DataSetSnapshot, ListSnapshot, StoredItem,
};
