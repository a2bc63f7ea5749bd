//! Stage ledger entities
//!
//! Each stage of a vehicle's journey owns its own currency-tagged costs and
//! derives a running total that folds in the running total of the stage
//! before it. Stages never reference each other; the predecessor's total is
//! passed in as an `Option`, and a missing predecessor contributes zero.
//!
//! ```text
//! Purchase ─► Shipping ─► WorldExpenses ─► KabulExpenses ─► RepairExpenses
//!  price       total to     all expenses     total cost       final cost
//!              Dubai        to Herat         in Kabul
//! ```

pub mod purchase;
pub mod shipping;
pub mod world;
pub mod kabul;
pub mod repair;

pub use purchase::{PaymentStatus, Purchase, PurchaseInput};
pub use shipping::{Shipping, ShippingInput};
pub use world::{WorldExpenses, WorldExpensesFields, WorldExpensesInput};
pub use kabul::{KabulExpenses, KabulExpensesFields, KabulExpensesInput};
pub use repair::{RepairExpenses, RepairExpensesInput};
