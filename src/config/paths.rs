//! Path management for MoneyWise
//!
//! ## Path Resolution Order
//!
//! 1. `MONEYWISE_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/moneywise` or `~/.config/moneywise`
//! 3. Windows: `%APPDATA%\moneywise`

use std::path::{Path, PathBuf};

use crate::error::{MoneyWiseError, MoneyWiseResult};

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "MONEYWISE_DATA_DIR";

#[derive(Debug, Clone)]
pub struct MoneyWisePaths {
    base_dir: PathBuf,
}

impl MoneyWisePaths {
    /// Resolve the base directory from the environment
    pub fn new() -> MoneyWiseResult<Self> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// The saved data set
    pub fn data_set_file(&self) -> PathBuf {
        self.data_dir().join("moneywise.json")
    }

    pub fn ensure_directories(&self) -> MoneyWiseResult<()> {
        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| MoneyWiseError::Io(format!("Failed to create data directory: {}", e)))
    }

    /// Whether a data set has been saved
    pub fn is_initialized(&self) -> bool {
        self.data_set_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> MoneyWiseResult<PathBuf> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                MoneyWiseError::Config("Could not determine home directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("moneywise"))
}

#[cfg(windows)]
fn resolve_default_path() -> MoneyWiseResult<PathBuf> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| MoneyWiseError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("moneywise"))
}
