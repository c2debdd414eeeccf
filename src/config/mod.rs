//! Configuration for MoneyWise
//!
//! - Path resolution for settings and data files
//! - User settings persistence (key derivation cost, progress reporting)

pub mod paths;
pub mod settings;

pub use paths::MoneyWisePaths;
pub use settings::{SecuritySettings, Settings};
