//! World expenses stage: Dubai to Herat through the border crossing

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, ValidationErrors, VehicleId, WorldExpensesId};
use domain_currency::CurrencyConverter;

use crate::cost::{CostEntry, Outstanding, OutstandingInput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldExpenses {
    pub id: WorldExpensesId,
    pub vehicle_id: VehicleId,
    /// Commission of the trading company
    pub business_commission: CostEntry,
    pub remaining_commission: Option<Outstanding>,
    /// Customs payment
    pub gomrok_payment: CostEntry,
    pub remaining_gomrok: Option<Outstanding>,
    /// Transport price to the border
    pub shipping_to_border: CostEntry,
    pub paid_for_shipping: CostEntry,
    /// Cached `base(shipping_to_border) - base(paid_for_shipping)`, refreshed on save
    pub remain_shipping: Decimal,
    pub return_date_from_dubai: Option<NaiveDate>,
    pub herat_arrival_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted world expenses fields, with the flag-gated balances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldExpensesInput {
    #[serde(default)]
    pub business_commission: CostEntry,
    #[serde(default)]
    pub has_remaining_commission: bool,
    pub remaining_commission: Option<Decimal>,
    pub remaining_commission_date: Option<NaiveDate>,
    #[serde(default)]
    pub gomrok_payment: CostEntry,
    #[serde(default)]
    pub has_remaining_gomrok: bool,
    pub remaining_gomrok: Option<Decimal>,
    pub remaining_gomrok_date: Option<NaiveDate>,
    #[serde(default)]
    pub shipping_to_border: CostEntry,
    #[serde(default)]
    pub paid_for_shipping: CostEntry,
    pub return_date_from_dubai: Option<NaiveDate>,
    pub herat_arrival_date: Option<NaiveDate>,
}

/// Validated world expenses fields
#[derive(Debug, Clone)]
pub struct WorldExpensesFields {
    business_commission: CostEntry,
    remaining_commission: Option<Outstanding>,
    gomrok_payment: CostEntry,
    remaining_gomrok: Option<Outstanding>,
    shipping_to_border: CostEntry,
    paid_for_shipping: CostEntry,
    return_date_from_dubai: Option<NaiveDate>,
    herat_arrival_date: Option<NaiveDate>,
}

impl WorldExpensesInput {
    /// Checks the flag-gated balances, reporting every missing field
    pub fn validate(self) -> Result<WorldExpensesFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let remaining_commission = OutstandingInput::new(
            self.has_remaining_commission,
            self.remaining_commission,
            self.remaining_commission_date,
        )
        .resolve("remaining_commission", "remaining_commission_date", &mut errors);
        let remaining_gomrok = OutstandingInput::new(
            self.has_remaining_gomrok,
            self.remaining_gomrok,
            self.remaining_gomrok_date,
        )
        .resolve("remaining_gomrok", "remaining_gomrok_date", &mut errors);
        errors.into_result()?;

        Ok(WorldExpensesFields {
            business_commission: self.business_commission,
            remaining_commission,
            gomrok_payment: self.gomrok_payment,
            remaining_gomrok,
            shipping_to_border: self.shipping_to_border,
            paid_for_shipping: self.paid_for_shipping,
            return_date_from_dubai: self.return_date_from_dubai,
            herat_arrival_date: self.herat_arrival_date,
        })
    }
}

impl WorldExpenses {
    pub fn new(vehicle_id: VehicleId, fields: WorldExpensesFields) -> Self {
        let now = Utc::now();
        let mut world = Self {
            id: WorldExpensesId::new_v7(),
            vehicle_id,
            business_commission: CostEntry::default(),
            remaining_commission: None,
            gomrok_payment: CostEntry::default(),
            remaining_gomrok: None,
            shipping_to_border: CostEntry::default(),
            paid_for_shipping: CostEntry::default(),
            remain_shipping: Decimal::ZERO,
            return_date_from_dubai: None,
            herat_arrival_date: None,
            created_at: now,
            updated_at: now,
        };
        world.apply(fields);
        world
    }

    /// Replaces the submitted fields, keeping identity and creation time
    pub fn apply(&mut self, fields: WorldExpensesFields) {
        self.business_commission = fields.business_commission;
        self.remaining_commission = fields.remaining_commission;
        self.gomrok_payment = fields.gomrok_payment;
        self.remaining_gomrok = fields.remaining_gomrok;
        self.shipping_to_border = fields.shipping_to_border;
        self.paid_for_shipping = fields.paid_for_shipping;
        self.return_date_from_dubai = fields.return_date_from_dubai;
        self.herat_arrival_date = fields.herat_arrival_date;
        self.updated_at = Utc::now();
    }

    pub fn uses_currency(&self, code: &CurrencyCode) -> bool {
        [
            &self.business_commission,
            &self.gomrok_payment,
            &self.shipping_to_border,
            &self.paid_for_shipping,
        ]
        .iter()
        .any(|entry| entry.is_in(code))
    }

    /// Save-time derivation of the cached shipping balance
    pub fn recalculate(&mut self, converter: &CurrencyConverter<'_>) {
        self.remain_shipping =
            self.shipping_to_border.in_base(converter) - self.paid_for_shipping.in_base(converter);
    }

    /// Border transport, customs and trading commission in base units
    pub fn amount_to_herat(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.shipping_to_border.in_base(converter)
            + self.gomrok_payment.in_base(converter)
            + self.business_commission.in_base(converter)
    }

    /// `total_to_dubai` is the shipping stage's computed total, if one exists
    pub fn all_expenses_to_herat(
        &self,
        converter: &CurrencyConverter<'_>,
        total_to_dubai: Option<Decimal>,
    ) -> Decimal {
        total_to_dubai.unwrap_or(Decimal::ZERO) + self.amount_to_herat(converter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::{date, rates};
    use rust_decimal_macros::dec;

    fn input() -> WorldExpensesInput {
        WorldExpensesInput {
            business_commission: CostEntry::base(dec!(100)),
            gomrok_payment: CostEntry::base(dec!(200)),
            shipping_to_border: CostEntry::base(dec!(800)),
            paid_for_shipping: CostEntry::base(dec!(300)),
            ..Default::default()
        }
    }

    #[test]
    fn test_cleared_flags_drop_submitted_balances() {
        let fields = WorldExpensesInput {
            remaining_commission: Some(dec!(40)),
            remaining_gomrok_date: Some(date(2024, 5, 1)),
            ..input()
        }
        .validate()
        .unwrap();
        let world = WorldExpenses::new(VehicleId::new(), fields);

        assert_eq!(world.remaining_commission, None);
        assert_eq!(world.remaining_gomrok, None);
    }

    #[test]
    fn test_set_flags_require_amount_and_date() {
        let errors = WorldExpensesInput {
            has_remaining_commission: true,
            has_remaining_gomrok: true,
            remaining_gomrok: Some(dec!(75)),
            ..input()
        }
        .validate()
        .unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("remaining_commission"));
        assert!(errors.has_field("remaining_commission_date"));
        assert!(errors.has_field("remaining_gomrok_date"));
    }

    #[test]
    fn test_totals_to_herat() {
        let book = rates();
        let converter = CurrencyConverter::new(&book);
        let mut world = WorldExpenses::new(VehicleId::new(), input().validate().unwrap());
        world.recalculate(&converter);

        assert_eq!(world.remain_shipping, dec!(500));
        assert_eq!(world.amount_to_herat(&converter), dec!(1100));
        assert_eq!(world.all_expenses_to_herat(&converter, Some(dec!(5000))), dec!(6100));
        assert_eq!(world.all_expenses_to_herat(&converter, None), dec!(1100));
    }
}
