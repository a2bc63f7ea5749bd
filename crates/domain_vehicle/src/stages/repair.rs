//! Repair and other expenses stage, the last one before sale

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, RepairExpensesId, VehicleId};
use domain_currency::CurrencyConverter;

use crate::cost::CostEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairExpenses {
    pub id: RepairExpensesId,
    pub vehicle_id: VehicleId,
    pub repair_cost: CostEntry,
    /// Entered by hand, never derived
    pub remaining_repair_cost: Decimal,
    /// Plate and registration
    pub palate_cost: CostEntry,
    /// Entered by hand, never derived
    pub palate_remaining_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted repair fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepairExpensesInput {
    #[serde(default)]
    pub repair_cost: CostEntry,
    #[serde(default)]
    pub remaining_repair_cost: Decimal,
    #[serde(default)]
    pub palate_cost: CostEntry,
    #[serde(default)]
    pub palate_remaining_cost: Decimal,
}

impl RepairExpenses {
    pub fn new(vehicle_id: VehicleId, input: RepairExpensesInput) -> Self {
        let now = Utc::now();
        Self {
            id: RepairExpensesId::new_v7(),
            vehicle_id,
            repair_cost: input.repair_cost,
            remaining_repair_cost: input.remaining_repair_cost,
            palate_cost: input.palate_cost,
            palate_remaining_cost: input.palate_remaining_cost,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the submitted fields, keeping identity and creation time
    pub fn apply(&mut self, input: RepairExpensesInput) {
        self.repair_cost = input.repair_cost;
        self.remaining_repair_cost = input.remaining_repair_cost;
        self.palate_cost = input.palate_cost;
        self.palate_remaining_cost = input.palate_remaining_cost;
        self.updated_at = Utc::now();
    }

    pub fn uses_currency(&self, code: &CurrencyCode) -> bool {
        self.repair_cost.is_in(code) || self.palate_cost.is_in(code)
    }

    /// Repair plus plate costs in base units
    pub fn own_costs(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.repair_cost.in_base(converter) + self.palate_cost.in_base(converter)
    }

    /// `total_cost_in_kabul` comes from the Kabul stage, if one exists
    pub fn final_cost(
        &self,
        converter: &CurrencyConverter<'_>,
        total_cost_in_kabul: Option<Decimal>,
    ) -> Decimal {
        total_cost_in_kabul.unwrap_or(Decimal::ZERO) + self.own_costs(converter)
    }
}
