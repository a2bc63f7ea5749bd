//! API error handling

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{FieldError, PortError, ValidationErrors};
use domain_currency::CurrencyError;
use domain_vehicle::VehicleError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(ValidationErrors::single(field, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                error: error_type.to_string(),
                message: "Validation failed".to_string(),
                details: Some(errors.errors().to_vec()),
            },
            other => ErrorResponse {
                error: error_type.to_string(),
                message: other.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id}"))
            }
            PortError::Validation(errors) => ApiError::Validation(errors),
            PortError::Conflict { message } => ApiError::Conflict(message),
            err @ PortError::Connection { .. } => ApiError::Unavailable(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<VehicleError> for ApiError {
    fn from(err: VehicleError) -> Self {
        match err {
            VehicleError::Validation(errors) => ApiError::Validation(errors),
            VehicleError::NotFound { entity, id } => ApiError::NotFound(format!("{entity} {id}")),
            VehicleError::Conflict(message) => ApiError::Conflict(message),
            VehicleError::Storage(message) => ApiError::Internal(message),
            VehicleError::Port(port) => port.into(),
        }
    }
}

impl From<CurrencyError> for ApiError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::Validation(errors) => ApiError::Validation(errors),
            CurrencyError::NotFound(id) => ApiError::NotFound(format!("Currency {id}")),
            CurrencyError::Conflict(message) => ApiError::Conflict(message),
            CurrencyError::Port(port) => port.into(),
        }
    }
}

/// Request-level checks declared with `validator` attributes
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut errors = ValidationErrors::new();
        for (field, failures) in fields {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
        ApiError::Validation(errors)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}
