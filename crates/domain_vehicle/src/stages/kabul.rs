//! Kabul expenses stage: Herat to Kabul

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, KabulExpensesId, ValidationErrors, VehicleId};
use domain_currency::CurrencyConverter;

use crate::cost::{CostEntry, Outstanding, OutstandingInput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KabulExpenses {
    pub id: KabulExpensesId,
    pub vehicle_id: VehicleId,
    pub herat_to_kabul: CostEntry,
    /// Kept as submitted
    pub remaining: Option<Outstanding>,
    pub arrival_date_kabul: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted Kabul expenses fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KabulExpensesInput {
    #[serde(default)]
    pub herat_to_kabul: CostEntry,
    #[serde(default)]
    pub has_remaining: bool,
    pub remaining: Option<Decimal>,
    pub remaining_date: Option<NaiveDate>,
    pub arrival_date_kabul: Option<NaiveDate>,
}

/// Validated Kabul expenses fields
#[derive(Debug, Clone)]
pub struct KabulExpensesFields {
    herat_to_kabul: CostEntry,
    remaining: Option<Outstanding>,
    arrival_date_kabul: Option<NaiveDate>,
}

impl KabulExpensesInput {
    pub fn validate(self) -> Result<KabulExpensesFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let remaining = OutstandingInput::new(self.has_remaining, self.remaining, self.remaining_date)
            .resolve("remaining", "remaining_date", &mut errors);
        errors.into_result()?;

        Ok(KabulExpensesFields {
            herat_to_kabul: self.herat_to_kabul,
            remaining,
            arrival_date_kabul: self.arrival_date_kabul,
        })
    }
}

impl KabulExpenses {
    pub fn new(vehicle_id: VehicleId, fields: KabulExpensesFields) -> Self {
        let now = Utc::now();
        Self {
            id: KabulExpensesId::new_v7(),
            vehicle_id,
            herat_to_kabul: fields.herat_to_kabul,
            remaining: fields.remaining,
            arrival_date_kabul: fields.arrival_date_kabul,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the submitted fields, keeping identity and creation time
    pub fn apply(&mut self, fields: KabulExpensesFields) {
        self.herat_to_kabul = fields.herat_to_kabul;
        self.remaining = fields.remaining;
        self.arrival_date_kabul = fields.arrival_date_kabul;
        self.updated_at = Utc::now();
    }

    pub fn uses_currency(&self, code: &CurrencyCode) -> bool {
        self.herat_to_kabul.is_in(code)
    }

    pub fn herat_to_kabul_in_base(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.herat_to_kabul.in_base(converter)
    }

    /// `amount_to_herat` comes from the world expenses stage, if one exists
    pub fn usa_to_kabul_cost(
        &self,
        converter: &CurrencyConverter<'_>,
        amount_to_herat: Option<Decimal>,
    ) -> Decimal {
        amount_to_herat.unwrap_or(Decimal::ZERO) + self.herat_to_kabul_in_base(converter)
    }

    /// `all_expenses_to_herat` comes from the world expenses stage, if one exists
    pub fn total_cost_in_kabul(
        &self,
        converter: &CurrencyConverter<'_>,
        all_expenses_to_herat: Option<Decimal>,
    ) -> Decimal {
        all_expenses_to_herat.unwrap_or(Decimal::ZERO) + self.herat_to_kabul_in_base(converter)
    }
}
