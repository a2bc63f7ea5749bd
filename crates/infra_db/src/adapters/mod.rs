//! Port adapters
//!
//! Each adapter implements domain port traits on top of the repository layer
//! and translates `DatabaseError` into `PortError` on the way out.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_vehicle::VehiclePort;
//! use infra_db::adapters::PostgresLedgerAdapter;
//!
//! let port: Arc<dyn VehiclePort> = Arc::new(PostgresLedgerAdapter::new(pool));
//! let dossier = port.load_dossier(vehicle_id).await?;
//! ```

pub mod currency;
pub mod ledger;

pub use currency::PostgresCurrencyAdapter;
pub use ledger::PostgresLedgerAdapter;

use std::time::Instant;

use core_kernel::HealthCheckResult;
use sqlx::PgPool;

/// Round-trips `SELECT 1` and reports the latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {e}")),
    }
}
