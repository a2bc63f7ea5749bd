//! The stage derivation chain of one vehicle
//!
//! A [`VehicleDossier`] holds a vehicle with whichever stages exist. A
//! [`CostChain`] walks it with a converter: each derived total resolves its
//! predecessor explicitly, and a stage that does not exist yields `None` for
//! its own totals while contributing zero to its successors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_currency::CurrencyConverter;

use crate::sale::{SaleInfo, SaleStatus, SaleSummary};
use crate::stages::{KabulExpenses, PaymentStatus, Purchase, RepairExpenses, Shipping, WorldExpenses};
use crate::vehicle::Vehicle;

/// A vehicle together with every stage recorded for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDossier {
    pub vehicle: Vehicle,
    pub purchase: Option<Purchase>,
    pub shipping: Option<Shipping>,
    pub world_expenses: Option<WorldExpenses>,
    pub kabul_expenses: Option<KabulExpenses>,
    pub repair_expenses: Option<RepairExpenses>,
    pub sale: Option<SaleInfo>,
}

impl VehicleDossier {
    /// A vehicle with no stages yet
    pub fn new(vehicle: Vehicle) -> Self {
        Self {
            vehicle,
            purchase: None,
            shipping: None,
            world_expenses: None,
            kabul_expenses: None,
            repair_expenses: None,
            sale: None,
        }
    }

    pub fn sale_status(&self) -> Option<SaleStatus> {
        self.sale.as_ref().map(|s| s.status)
    }

    pub fn is_sold(&self) -> bool {
        self.sale_status() == Some(SaleStatus::Sold)
    }

    pub fn chain<'a>(&'a self, converter: CurrencyConverter<'a>) -> CostChain<'a> {
        CostChain {
            dossier: self,
            converter,
        }
    }
}

/// Derived totals of a dossier, computed on demand
#[derive(Debug, Clone, Copy)]
pub struct CostChain<'a> {
    dossier: &'a VehicleDossier,
    converter: CurrencyConverter<'a>,
}

impl<'a> CostChain<'a> {
    pub fn purchase_price(&self) -> Option<Decimal> {
        self.dossier
            .purchase
            .as_ref()
            .map(|p| p.price_in_base(&self.converter))
    }

    pub fn invoice_total_dubai(&self) -> Option<Decimal> {
        self.dossier
            .shipping
            .as_ref()
            .map(|s| s.invoice_total_dubai(&self.converter))
    }

    pub fn dubai_remain_invoice(&self) -> Option<Decimal> {
        self.dossier
            .shipping
            .as_ref()
            .map(|s| s.dubai_remain_invoice(&self.converter))
    }

    pub fn cost_to_dubai(&self) -> Option<Decimal> {
        self.dossier
            .shipping
            .as_ref()
            .map(|s| s.cost_to_dubai(&self.converter))
    }

    pub fn total_price_to_dubai(&self) -> Option<Decimal> {
        self.dossier.shipping.as_ref().map(|s| {
            s.computed_total_price_to_dubai(&self.converter, self.dossier.purchase.as_ref())
        })
    }

    pub fn amount_to_herat(&self) -> Option<Decimal> {
        self.dossier
            .world_expenses
            .as_ref()
            .map(|w| w.amount_to_herat(&self.converter))
    }

    pub fn all_expenses_to_herat(&self) -> Option<Decimal> {
        self.dossier
            .world_expenses
            .as_ref()
            .map(|w| w.all_expenses_to_herat(&self.converter, self.total_price_to_dubai()))
    }

    pub fn usa_to_kabul_cost(&self) -> Option<Decimal> {
        self.dossier
            .kabul_expenses
            .as_ref()
            .map(|k| k.usa_to_kabul_cost(&self.converter, self.amount_to_herat()))
    }

    pub fn total_cost_in_kabul(&self) -> Option<Decimal> {
        self.dossier
            .kabul_expenses
            .as_ref()
            .map(|k| k.total_cost_in_kabul(&self.converter, self.all_expenses_to_herat()))
    }

    pub fn final_cost(&self) -> Option<Decimal> {
        self.dossier
            .repair_expenses
            .as_ref()
            .map(|r| r.final_cost(&self.converter, self.total_cost_in_kabul()))
    }

    /// Sale reconciliation; all zero when no sale record exists
    pub fn sale_summary(&self) -> SaleSummary {
        match &self.dossier.sale {
            Some(sale) => sale.summary(&self.converter, self.final_cost()),
            None => SaleSummary::default(),
        }
    }

    /// Costs spent after the purchase, each converted at its own date
    ///
    /// Shipping counts through `cost_to_dubai`, world expenses through
    /// `amount_to_herat`, then the Herat to Kabul cost and the repair and
    /// plate costs.
    pub fn expenses(&self) -> Decimal {
        let c = &self.converter;
        let d = self.dossier;
        d.shipping.as_ref().map(|s| s.cost_to_dubai(c)).unwrap_or_default()
            + d.world_expenses.as_ref().map(|w| w.amount_to_herat(c)).unwrap_or_default()
            + d.kabul_expenses.as_ref().map(|k| k.herat_to_kabul_in_base(c)).unwrap_or_default()
            + d.repair_expenses.as_ref().map(|r| r.own_costs(c)).unwrap_or_default()
    }

    pub fn report(&self) -> CostReport {
        let d = self.dossier;
        CostReport {
            vehicle_id: d.vehicle.id.to_string(),
            lot_number: d.vehicle.lot_number.clone(),
            base_currency: self.converter.base_code().map(ToString::to_string),
            purchase_price: self.purchase_price(),
            remain_purchase: d.purchase.as_ref().map(|p| p.remain_purchase),
            payment_status: d.purchase.as_ref().map(Purchase::payment_status),
            invoice_total_dubai: self.invoice_total_dubai(),
            dubai_remain_invoice: self.dubai_remain_invoice(),
            cost_to_dubai: self.cost_to_dubai(),
            total_price_to_dubai: self.total_price_to_dubai(),
            amount_to_herat: self.amount_to_herat(),
            remain_shipping: d.world_expenses.as_ref().map(|w| w.remain_shipping),
            all_expenses_to_herat: self.all_expenses_to_herat(),
            usa_to_kabul_cost: self.usa_to_kabul_cost(),
            total_cost_in_kabul: self.total_cost_in_kabul(),
            final_cost: self.final_cost(),
            sale_status: d.sale_status(),
            sale: self.sale_summary(),
        }
    }
}

/// Every derived figure of one vehicle, in base units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostReport {
    pub vehicle_id: String,
    pub lot_number: String,
    pub base_currency: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub remain_purchase: Option<Decimal>,
    pub payment_status: Option<PaymentStatus>,
    pub invoice_total_dubai: Option<Decimal>,
    pub dubai_remain_invoice: Option<Decimal>,
    pub cost_to_dubai: Option<Decimal>,
    pub total_price_to_dubai: Option<Decimal>,
    pub amount_to_herat: Option<Decimal>,
    pub remain_shipping: Option<Decimal>,
    pub all_expenses_to_herat: Option<Decimal>,
    pub usa_to_kabul_cost: Option<Decimal>,
    pub total_cost_in_kabul: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub sale_status: Option<SaleStatus>,
    pub sale: SaleSummary,
}
