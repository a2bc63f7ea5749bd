//! Core Kernel - Foundational types shared by the vehicle ledger crates
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Validated currency codes, tagged amounts and commission rates
//! - Typed identifiers
//! - Field-level validation errors
//! - Port traits and errors for the adapter layer

pub mod money;
pub mod identifiers;
pub mod validation;
pub mod ports;

pub use money::{CurrencyCode, Money, MoneyError, Rate};
pub use identifiers::{
    BuyerId, CurrencyId, IdParseError, ImageId, KabulExpensesId, PurchaseId, RateHistoryId,
    ReferenceId, RepairExpensesId, SaleId, ShippingId, VehicleId, WorldExpensesId,
};
pub use validation::{FieldError, ValidationErrors};
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
