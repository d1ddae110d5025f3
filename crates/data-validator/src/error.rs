//! Validation Error Types

use thiserror::Error;

/// Errors during input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Categorical value outside the declared vocabulary (single-record mode only)
    #[error("Invalid {field} value: {value}. Expected {expected}.")]
    InvalidCategory {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ValidationError {
    /// Field that carried the offending value
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidCategory { field, .. } => field,
        }
    }
}
