//! Vehicle ledger errors

use thiserror::Error;

use core_kernel::{PortError, ValidationErrors};
use domain_currency::CurrencyError;

/// Errors that can occur in the vehicle ledger
#[derive(Debug, Error)]
pub enum VehicleError {
    /// The submitted record was rejected field by field; nothing was written
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A referenced vehicle, stage, buyer or catalog item does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The operation conflicts with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Image storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The underlying store failed
    #[error(transparent)]
    Port(PortError),
}

impl VehicleError {
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        VehicleError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VehicleError::Validation(ValidationErrors::single(field, message))
    }

    pub fn storage(message: impl Into<String>) -> Self {
        VehicleError::Storage(message.into())
    }
}

impl From<ValidationErrors> for VehicleError {
    fn from(errors: ValidationErrors) -> Self {
        VehicleError::Validation(errors)
    }
}

impl From<PortError> for VehicleError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => VehicleError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Validation(errors) => VehicleError::Validation(errors),
            PortError::Conflict { message } => VehicleError::Conflict(message),
            other => VehicleError::Port(other),
        }
    }
}

impl From<CurrencyError> for VehicleError {
    fn from(error: CurrencyError) -> Self {
        match error {
            CurrencyError::Validation(errors) => VehicleError::Validation(errors),
            CurrencyError::NotFound(id) => VehicleError::not_found("Currency", id),
            CurrencyError::Conflict(message) => VehicleError::Conflict(message),
            CurrencyError::Port(err) => VehicleError::Port(err),
        }
    }
}

impl From<std::io::Error> for VehicleError {
    fn from(error: std::io::Error) -> Self {
        VehicleError::Storage(error.to_string())
    }
}
