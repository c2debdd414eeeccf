//! MoneyWise - versioned, validated personal finance records
//!
//! The core of the crate is a generic framework of versioned data lists:
//! items keep a history of their values, lists can be derived in several
//! styles (clone, update, difference) and rebased, and a data set ties
//! the lists together with link resolution and a key lifecycle for
//! encrypted values.
//!
//! # Architecture
//!
//! - `data`: items, lists, info sets, static lists and the data set
//! - `models`: MoneyWise entities (currencies, accounts, transactions)
//! - `security`: control keys, data keys and encrypted fields
//! - `crypto`: key derivation and authenticated encryption
//! - `storage`: JSON snapshots of data sets
//! - `report`: change summaries
//! - `config`: paths and settings
//! - `cli`: command handlers for the `moneywise` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use moneywise::models;
//!
//! let mut set = models::new_data_set();
//! models::populate_static_data(&mut set)?;
//! set.initialise_security("passphrase", &Default::default())?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod data;
pub mod error;
pub mod models;
pub mod report;
pub mod security;
pub mod storage;

pub use error::{MoneyWiseError, MoneyWiseResult};
