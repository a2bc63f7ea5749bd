//! Port plumbing shared by the domain crates
//!
//! Each domain declares its own port traits on top of [`DomainPort`]; the
//! PostgreSQL adapters live in `infra_db` and the in-memory ones next to the
//! traits they implement.
//!
//! | port | adapters |
//! |---|---|
//! | `CurrencyPort` | `PostgresCurrencyAdapter`, `InMemoryCurrencyStore` |
//! | `VehiclePort`, `BuyerPort`, `ReferencePort`, `SettingsPort` | `PostgresLedgerAdapter`, `InMemoryVehicleStore` |

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

/// Failure reported by any adapter, persistent or in-memory
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Duplicate key or a write that clashes with stored data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The backing store could not be reached
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Validation(ValidationErrors::single(field, message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// True when retrying later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

impl From<ValidationErrors> for PortError {
    fn from(errors: ValidationErrors) -> Self {
        PortError::Validation(errors)
    }
}

/// Marker for port traits; ports are shared across tasks behind `Arc<dyn _>`
pub trait DomainPort: Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Unhealthy,
}

/// Outcome of one readiness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    pub fn healthy(adapter_id: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn unhealthy(adapter_id: impl Into<String>, latency_ms: u64, message: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(message.into()),
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

/// Adapters probed by the readiness endpoint
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}
