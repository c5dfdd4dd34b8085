//! Error types for booking verification

use thiserror::Error;

/// Result type alias using the verification error
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Verification error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("{field} mismatch. Expected: {expected}, but found: {actual}")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("{rule}. Expected: {expected}, but found: {actual}")]
    BusinessRule {
        rule: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid date range: check-in {check_in} is not before check-out {check_out}")]
    InvalidDateRange { check_in: String, check_out: String },

    #[error("Invalid guest: {0}")]
    InvalidGuest(String),
}

impl VerifyError {
    pub fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        VerifyError::Mismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
