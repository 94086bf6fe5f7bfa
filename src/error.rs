//! Calculator error types
//!
//! Every core operation either returns a value or one of these recoverable errors.

use thiserror::Error;

/// Error kinds raised by the calculation core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// A user-supplied value is missing, non-numeric, non-positive or out of range
    #[error("{0}")]
    Validation(String),

    /// An unknown ingredient or allocation entry was referenced
    #[error("{0}")]
    NotFound(String),
}

/// Result type for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;

impl CalcError {
    pub fn validation(message: impl Into<String>) -> Self {
        CalcError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CalcError::NotFound(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CalcError::Validation(_))
    }
}

/// Require a present, finite value
pub fn require(value: Option<f64>, message: &str) -> CalcResult<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(CalcError::validation(message)),
    }
}
