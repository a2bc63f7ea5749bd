//! Purchase stage

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, PurchaseId, VehicleId};
use domain_currency::CurrencyConverter;

use crate::cost::CurrencyAmount;

/// How much of the purchase price has been paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    PartiallyPaid,
}

/// The auction purchase of a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub vehicle_id: VehicleId,
    pub purchase_price: CurrencyAmount,
    pub paid_amount: CurrencyAmount,
    /// Date both amounts convert at
    pub buy_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    /// Cached `base(purchase_price) - base(paid_amount)`, refreshed on save
    pub remain_purchase: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted purchase fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseInput {
    #[serde(default)]
    pub purchase_price: CurrencyAmount,
    #[serde(default)]
    pub paid_amount: CurrencyAmount,
    pub buy_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
}

impl Purchase {
    pub fn new(vehicle_id: VehicleId, input: PurchaseInput) -> Self {
        let now = Utc::now();
        Self {
            id: PurchaseId::new_v7(),
            vehicle_id,
            purchase_price: input.purchase_price,
            paid_amount: input.paid_amount,
            buy_date: input.buy_date,
            payment_date: input.payment_date,
            remain_purchase: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the submitted fields, keeping identity and creation time
    pub fn apply(&mut self, input: PurchaseInput) {
        self.purchase_price = input.purchase_price;
        self.paid_amount = input.paid_amount;
        self.buy_date = input.buy_date;
        self.payment_date = input.payment_date;
        self.updated_at = Utc::now();
    }

    pub fn uses_currency(&self, code: &CurrencyCode) -> bool {
        self.purchase_price.is_in(code) || self.paid_amount.is_in(code)
    }

    pub fn price_in_base(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.purchase_price.in_base_on(converter, self.buy_date)
    }

    pub fn paid_in_base(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.paid_amount.in_base_on(converter, self.buy_date)
    }

    /// Save-time derivation of the cached balance
    ///
    /// A balance of zero or less means fully paid and clears `payment_date`.
    pub fn recalculate(&mut self, converter: &CurrencyConverter<'_>) {
        self.remain_purchase = self.price_in_base(converter) - self.paid_in_base(converter);
        if self.remain_purchase <= Decimal::ZERO {
            self.payment_date = None;
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        if self.remain_purchase <= Decimal::ZERO {
            PaymentStatus::Paid
        } else if self.paid_amount.amount.is_zero() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::PartiallyPaid
        }
    }
}
