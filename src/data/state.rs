//! Style and state enumerations shared by items and lists

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a list plays relative to the core data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// The single source of truth
    Core,
    /// Deep copy of another list
    Clone,
    /// Shallow reference-only copy (items may not be created)
    Copy,
    /// Working copy for interactive editing
    Edit,
    /// Pending changes relative to the persisted core
    Update,
    /// Computed difference between two snapshots
    Differ,
}

impl fmt::Display for ListStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "Core"),
            Self::Clone => write!(f, "Clone"),
            Self::Copy => write!(f, "Copy"),
            Self::Edit => write!(f, "Edit"),
            Self::Update => write!(f, "Update"),
            Self::Differ => write!(f, "Differ"),
        }
    }
}

/// Edit/validation state of an item or list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    /// No outstanding changes
    #[default]
    Clean,
    /// Changed but not yet validated
    Dirty,
    /// Changed and validated
    Valid,
    /// Validation failed
    Error,
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "Clean"),
            Self::Dirty => write!(f, "Dirty"),
            Self::Valid => write!(f, "Valid"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Lifecycle state of an item, derived from its history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataState {
    NoState,
    New,
    Clean,
    Changed,
    Deleted,
    /// Created and then deleted since the last commit
    DelNew,
    /// Deleted at the last commit and since restored
    Recovered,
}

impl DataState {
    /// Whether an item in this state has anything to persist
    pub fn has_changes(&self) -> bool {
        !matches!(self, Self::NoState | Self::Clean)
    }
}

impl fmt::Display for DataState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoState => write!(f, "NoState"),
            Self::New => write!(f, "New"),
            Self::Clean => write!(f, "Clean"),
            Self::Changed => write!(f, "Changed"),
            Self::Deleted => write!(f, "Deleted"),
            Self::DelNew => write!(f, "DelNew"),
            Self::Recovered => write!(f, "Recovered"),
        }
    }
}
