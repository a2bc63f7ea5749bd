//! Test Utilities Crate
//!
//! Shared test infrastructure for the vehicle ledger test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built currencies, dates and codes
//! - `builders`: Builders for stage inputs and dossiers
//! - `memory`: A fully wired ledger over the in-memory adapters
//! - `assertions`: Assertion helpers for amounts and validation errors
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod memory;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use memory::*;
pub use assertions::*;
pub use generators::*;
