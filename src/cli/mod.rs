//! CLI command handlers
//!
//! Bridges the clap argument parsing in `main.rs` with the data set and
//! storage layers.

pub mod account;
pub mod data;
pub mod passphrase;

pub use account::{handle_account_command, AccountCommands};
pub use data::{handle_check, handle_config, handle_diff, handle_init, handle_renew};
pub use passphrase::PassphraseSource;
