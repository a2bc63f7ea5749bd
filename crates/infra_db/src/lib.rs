//! PostgreSQL persistence for the vehicle ledger
//!
//! The crate owns the schema (embedded migrations), the repositories that
//! hold the SQL, and the adapters that implement the domain ports on top of
//! them.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::{PostgresCurrencyAdapter, PostgresLedgerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/vehicle_ledger")).await?;
//! run_migrations(&pool).await?;
//! let currencies = Arc::new(PostgresCurrencyAdapter::new(pool.clone()));
//! let ledger = Arc::new(PostgresLedgerAdapter::new(pool));
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{PostgresCurrencyAdapter, PostgresLedgerAdapter};
