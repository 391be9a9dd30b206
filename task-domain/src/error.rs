use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
///
/// Create/update validation returns every failure at once so the caller can
/// re-render the whole form, not just the first broken field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
