//! Test Data Builders
//!
//! Builders for stage inputs and whole dossiers. Tests set only the fields
//! they care about; everything else stays at its zero default.

use chrono::NaiveDate;
use core_kernel::BuyerId;
use domain_vehicle::{
    CostEntry, CurrencyAmount, KabulExpenses, KabulExpensesInput, Purchase, PurchaseInput,
    RepairExpenses, RepairExpensesInput, SaleInfo, SaleInput, SaleStatus, Shipping, ShippingInput,
    Vehicle, VehicleDetails, VehicleDossier, WorldExpenses, WorldExpensesInput,
};
use rust_decimal::Decimal;

use crate::fixtures::DateFixtures;

/// Builder for shipping submissions
#[derive(Debug, Clone, Default)]
pub struct ShippingInputBuilder {
    input: ShippingInput,
}

impl ShippingInputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commission(mut self, entry: CostEntry) -> Self {
        self.input.commission = entry;
        self
    }

    pub fn clearing(mut self, entry: CostEntry) -> Self {
        self.input.clearing = entry;
        self
    }

    pub fn towing(mut self, entry: CostEntry) -> Self {
        self.input.towing = entry;
        self
    }

    pub fn shipping(mut self, entry: CostEntry) -> Self {
        self.input.shipping = entry;
        self
    }

    pub fn cash_paid_commission(mut self, entry: CostEntry) -> Self {
        self.input.cash_paid_commission = entry;
        self
    }

    pub fn dubai_paid_invoice(mut self, entry: CostEntry) -> Self {
        self.input.dubai_paid_invoice = entry;
        self
    }

    pub fn total_price_to_dubai(mut self, amount: CurrencyAmount) -> Self {
        self.input.total_price_to_dubai = amount;
        self
    }

    pub fn container(mut self, number: impl Into<String>) -> Self {
        self.input.container_number = number.into();
        self
    }

    pub fn build(self) -> ShippingInput {
        self.input
    }
}

/// Builder for sale submissions
#[derive(Debug, Clone, Default)]
pub struct SaleInputBuilder {
    input: SaleInput,
}

impl SaleInputBuilder {
    /// Ready for sale, nothing else set
    pub fn new() -> Self {
        Self::default()
    }

    /// Sold to `buyer` for `price` in the base currency on the fixture sale date
    pub fn sold(buyer: BuyerId, price: Decimal) -> Self {
        Self::new()
            .status(SaleStatus::Sold)
            .buyer(buyer)
            .price(CurrencyAmount::usd(price))
            .sale_date(DateFixtures::sale())
    }

    pub fn status(mut self, status: SaleStatus) -> Self {
        self.input.status = status;
        self
    }

    pub fn buyer(mut self, buyer: BuyerId) -> Self {
        self.input.buyer_id = Some(buyer);
        self
    }

    pub fn price(mut self, price: CurrencyAmount) -> Self {
        self.input.sale_price = price;
        self
    }

    pub fn sale_date(mut self, date: NaiveDate) -> Self {
        self.input.sale_date = Some(date);
        self
    }

    pub fn split_note(mut self, note: impl Into<String>) -> Self {
        self.input.split_note = note.into();
        self
    }

    pub fn build(self) -> SaleInput {
        self.input
    }
}

/// Builds a dossier without going through a store
///
/// Stages are constructed from their inputs as submitted; cached balances
/// such as `remain_purchase` are not recalculated. Derived totals come from
/// the chain, which does not read them.
pub struct TestDossierBuilder {
    dossier: VehicleDossier,
}

impl Default for TestDossierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDossierBuilder {
    pub fn new() -> Self {
        Self {
            dossier: VehicleDossier::new(Vehicle::new(VehicleDetails::default())),
        }
    }

    pub fn purchase(mut self, input: PurchaseInput) -> Self {
        self.dossier.purchase = Some(Purchase::new(self.dossier.vehicle.id, input));
        self
    }

    /// A purchase with only a price in the base currency
    pub fn purchase_price(self, price: Decimal) -> Self {
        self.purchase(PurchaseInput {
            purchase_price: CurrencyAmount::usd(price),
            ..Default::default()
        })
    }

    pub fn shipping(mut self, input: ShippingInput) -> Self {
        self.dossier.shipping = Some(Shipping::new(self.dossier.vehicle.id, input));
        self
    }

    /// Panics when the flag-gated balances are incomplete
    pub fn world(mut self, input: WorldExpensesInput) -> Self {
        let fields = input.validate().unwrap();
        self.dossier.world_expenses = Some(WorldExpenses::new(self.dossier.vehicle.id, fields));
        self
    }

    /// Panics when the flag-gated balance is incomplete
    pub fn kabul(mut self, input: KabulExpensesInput) -> Self {
        let fields = input.validate().unwrap();
        self.dossier.kabul_expenses = Some(KabulExpenses::new(self.dossier.vehicle.id, fields));
        self
    }

    pub fn repair(mut self, input: RepairExpensesInput) -> Self {
        self.dossier.repair_expenses = Some(RepairExpenses::new(self.dossier.vehicle.id, input));
        self
    }

    /// Repair costs only, in the base currency
    pub fn repair_cost(self, amount: Decimal) -> Self {
        self.repair(RepairExpensesInput {
            repair_cost: CostEntry::base(amount),
            ..Default::default()
        })
    }

    pub fn sale(mut self, input: SaleInput) -> Self {
        self.dossier.sale = Some(SaleInfo::new(self.dossier.vehicle.id, input));
        self
    }

    pub fn build(self) -> VehicleDossier {
        self.dossier
    }
}
