//! Custom error types for MoneyWise
//!
//! This module defines the error hierarchy for the crate using thiserror.
//! Data errors are business-rule failures that callers can report to the
//! user; `IllegalState` marks a broken invariant in calling code; and
//! `Cancelled` unwinds an operation stopped through a task control.

use std::fmt;

use thiserror::Error;

/// The kind of a data (validation / business rule) failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataErrorKind {
    /// An id is already held by another item of the list
    DuplicateId,
    /// A field value must be unique within the list
    DuplicateValue,
    /// An info class is already registered for the owner
    DuplicateInfoType,
    /// The value is not acceptable for the field
    InvalidValue,
    /// The field links to an item that does not exist
    InvalidLink,
    /// A required value is missing
    Missing,
    /// The value is longer than the field allows
    LengthExceeded,
    /// The requested item does not exist
    NotFound,
    /// A singleton control record already exists
    ControlRecordExists,
}

impl fmt::Display for DataErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId => write!(f, "Duplicate id"),
            Self::DuplicateValue => write!(f, "Duplicate value"),
            Self::DuplicateInfoType => write!(f, "Duplicate info type"),
            Self::InvalidValue => write!(f, "Invalid value"),
            Self::InvalidLink => write!(f, "Invalid link"),
            Self::Missing => write!(f, "Missing value"),
            Self::LengthExceeded => write!(f, "Length exceeded"),
            Self::NotFound => write!(f, "Not found"),
            Self::ControlRecordExists => write!(f, "Control record exists"),
        }
    }
}

/// The main error type for MoneyWise operations
#[derive(Error, Debug)]
pub enum MoneyWiseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation and business-rule failures
    #[error("{item_type}: {message}")]
    Data {
        kind: DataErrorKind,
        item_type: &'static str,
        message: String,
    },

    /// Programming invariant violations
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The operation was cancelled through its task control
    #[error("Operation cancelled during {0}")]
    Cancelled(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MoneyWiseError {
    /// Create a data error of the given kind
    pub fn data(kind: DataErrorKind, item_type: &'static str, message: impl Into<String>) -> Self {
        Self::Data {
            kind,
            item_type,
            message: message.into(),
        }
    }

    /// Create a "duplicate id" error
    pub fn duplicate_id(item_type: &'static str, id: u32) -> Self {
        Self::data(
            DataErrorKind::DuplicateId,
            item_type,
            format!("Duplicate id {}", id),
        )
    }

    /// Create a "not found" error
    pub fn not_found(item_type: &'static str, identifier: impl fmt::Display) -> Self {
        Self::data(
            DataErrorKind::NotFound,
            item_type,
            format!("Item not found: {}", identifier),
        )
    }

    /// The kind of a data error, if this is one
    pub fn data_kind(&self) -> Option<DataErrorKind> {
        match self {
            Self::Data { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if this is a data error
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    /// Check if this error came from a cancelled task
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl From<std::io::Error> for MoneyWiseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MoneyWiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for MoneyWise operations
pub type MoneyWiseResult<T> = Result<T, MoneyWiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MoneyWiseError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_duplicate_id_error() {
        let err = MoneyWiseError::duplicate_id("Account", 7);
        assert_eq!(err.to_string(), "Account: Duplicate id 7");
        assert_eq!(err.data_kind(), Some(DataErrorKind::DuplicateId));
        assert!(err.is_data_error());
    }

    #[test]
    fn test_cancelled_error() {
        let err = MoneyWiseError::Cancelled("Accounts".into());
        assert!(err.is_cancelled());
        assert!(!err.is_data_error());
        assert_eq!(err.to_string(), "Operation cancelled during Accounts");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MoneyWiseError = io_err.into();
        assert!(matches!(err, MoneyWiseError::Io(_)));
    }
}
