//! Currency domain errors

use thiserror::Error;

use core_kernel::{PortError, ValidationErrors};

/// Errors that can occur in the currency domain
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// One or more fields were rejected
    #[error("Invalid currency: {0}")]
    Validation(ValidationErrors),

    /// Currency with the given id or code was not found
    #[error("Currency not found: {0}")]
    NotFound(String),

    /// The request conflicts with existing currencies
    #[error("Currency conflict: {0}")]
    Conflict(String),

    /// The underlying store failed
    #[error(transparent)]
    Port(PortError),
}

impl CurrencyError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        CurrencyError::NotFound(id.to_string())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CurrencyError::Conflict(message.into())
    }
}

impl From<ValidationErrors> for CurrencyError {
    fn from(errors: ValidationErrors) -> Self {
        CurrencyError::Validation(errors)
    }
}

impl From<PortError> for CurrencyError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => CurrencyError::NotFound(id),
            PortError::Validation(errors) => CurrencyError::Validation(errors),
            PortError::Conflict { message } => CurrencyError::Conflict(message),
            other => CurrencyError::Port(other),
        }
    }
}
