//! Vehicle Ledger Domain
//!
//! Tracks the landed cost of imported vehicles across the stages of their
//! journey and reconciles the sale against it.
//!
//! # Key Concepts
//!
//! - **Vehicle**: the root record with its lot number and catalog references
//! - **Stages**: Purchase, Shipping, World Expenses, Kabul Expenses and
//!   Repair Expenses, at most one of each per vehicle
//! - **CostChain**: derives each stage's running total from its own costs and
//!   the total of the stage before it
//! - **SaleInfo**: sale record; unsold stock is valued at its final cost
//! - **VehicleLedger**: the service that validates, derives and saves
//!
//! # Example
//!
//! ```rust
//! use domain_currency::{Currency, CurrencyConverter, RateBook};
//! use domain_vehicle::{
//!     cost::CostEntry, stages::RepairExpensesInput, RepairExpenses, Vehicle, VehicleDetails,
//!     VehicleDossier,
//! };
//! use rust_decimal_macros::dec;
//!
//! let book = RateBook::new(vec![Currency::us_dollar()], vec![]);
//! let vehicle = Vehicle::new(VehicleDetails::default());
//! let mut dossier = VehicleDossier::new(vehicle);
//! dossier.repair_expenses = Some(RepairExpenses::new(
//!     dossier.vehicle.id,
//!     RepairExpensesInput {
//!         repair_cost: CostEntry::base(dec!(400)),
//!         ..Default::default()
//!     },
//! ));
//!
//! let chain = dossier.chain(CurrencyConverter::new(&book));
//! // no earlier stages, so only the repair itself counts
//! assert_eq!(chain.final_cost(), Some(dec!(400)));
//! assert_eq!(chain.total_cost_in_kabul(), None);
//! ```

pub mod cost;
pub mod reference;
pub mod vehicle;
pub mod stages;
pub mod sale;
pub mod chain;
pub mod dashboard;
pub mod image;
pub mod settings;
pub mod error;
pub mod ports;
pub mod service;

pub use cost::{CostEntry, CurrencyAmount, Outstanding};
pub use reference::{NewReferenceItem, ReferenceItem, ReferenceKind};
pub use vehicle::{Vehicle, VehicleDetails};
pub use stages::{
    KabulExpenses, KabulExpensesInput, PaymentStatus, Purchase, PurchaseInput, RepairExpenses,
    RepairExpensesInput, Shipping, ShippingInput, WorldExpenses, WorldExpensesInput,
};
pub use sale::{Buyer, NewBuyer, SaleInfo, SaleInput, SaleStatus, SaleSummary};
pub use chain::{CostChain, CostReport, VehicleDossier};
pub use dashboard::{DashboardSummary, DashboardVehicle};
pub use image::{FsImageStorage, ImageStorage, VehicleImage};
pub use settings::{DashboardSettings, SettingsUpdate};
pub use error::VehicleError;
pub use ports::{BuyerPort, ReferencePort, SettingsPort, VehiclePort};
pub use service::{LedgerPorts, VehicleLedger};

#[cfg(any(test, feature = "mock"))]
pub use image::mock::InMemoryImageStorage;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::InMemoryVehicleStore;
