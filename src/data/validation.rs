//! Per-field validation error collection

use std::fmt;

use crate::error::{DataErrorKind, MoneyWiseError};

/// One failure recorded against a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: DataErrorKind,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors collected while validating one item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &'static str, kind: DataErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            kind,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The kind of the first error recorded on `field`
    pub fn field_error_kind(&self, field: &str) -> Option<DataErrorKind> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.kind)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_kind(&self, kind: DataErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    pub fn remove_kind(&mut self, kind: DataErrorKind) {
        self.errors.retain(|e| e.kind != kind);
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Convert the first error into a crate error
    pub fn to_error(&self, item_type: &'static str) -> Option<MoneyWiseError> {
        self.errors
            .first()
            .map(|e| MoneyWiseError::data(e.kind, item_type, e.to_string()))
    }
}
