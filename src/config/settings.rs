//! User settings for MoneyWise

use serde::{Deserialize, Serialize};

use super::paths::MoneyWisePaths;
use crate::error::{MoneyWiseError, MoneyWiseResult};
use crate::models::CurrencyClass;
use crate::storage::file_io::{read_json, write_json_atomic};

/// Argon2id cost parameters for new control keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub security: SecuritySettings,

    /// Items processed between progress reports during long operations
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Currency given to accounts that do not name one
    #[serde(default = "default_currency")]
    pub default_currency: CurrencyClass,
}

fn default_schema_version() -> u32 {
    1
}

fn default_progress_interval() -> usize {
    50
}

fn default_currency() -> CurrencyClass {
    CurrencyClass::Gbp
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            security: SecuritySettings::default(),
            progress_interval: default_progress_interval(),
            default_currency: default_currency(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    ///
    /// Defaults are not written; the caller decides when to persist.
    pub fn load_or_create(paths: &MoneyWisePaths) -> MoneyWiseResult<Self> {
        let settings: Option<Settings> = read_json(paths.settings_file()).map_err(|e| {
            MoneyWiseError::Config(format!("Failed to read settings file: {}", e))
        })?;
        Ok(settings.unwrap_or_default())
    }

    pub fn save(&self, paths: &MoneyWisePaths) -> MoneyWiseResult<()> {
        std::fs::create_dir_all(paths.base_dir())
            .map_err(|e| MoneyWiseError::Io(format!("Failed to create base directory: {}", e)))?;
        write_json_atomic(paths.settings_file(), self)
    }
}
