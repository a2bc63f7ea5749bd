//! Shipping stage: auction yard to Dubai

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, ShippingId, VehicleId};
use domain_currency::CurrencyConverter;

use crate::cost::{CostEntry, CurrencyAmount};
use crate::stages::purchase::Purchase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub id: ShippingId,
    pub vehicle_id: VehicleId,
    pub commission: CostEntry,
    pub clearing: CostEntry,
    pub duty_vat: CostEntry,
    pub delivery_order: CostEntry,
    pub red_sea: CostEntry,
    pub towing: CostEntry,
    pub shipping: CostEntry,
    pub port_clips_prmi: CostEntry,
    pub attestation: CostEntry,
    pub cash_paid_commission: CostEntry,
    pub dubai_paid_invoice: CostEntry,
    /// Entered by hand; informational only
    pub total_price_to_dubai: CurrencyAmount,
    pub date_arrived_in_dubai: Option<NaiveDate>,
    pub etd_from_usa: Option<NaiveDate>,
    pub container_number: String,
    pub booking_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted shipping fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInput {
    #[serde(default)]
    pub commission: CostEntry,
    #[serde(default)]
    pub clearing: CostEntry,
    #[serde(default)]
    pub duty_vat: CostEntry,
    #[serde(default)]
    pub delivery_order: CostEntry,
    #[serde(default)]
    pub red_sea: CostEntry,
    #[serde(default)]
    pub towing: CostEntry,
    #[serde(default)]
    pub shipping: CostEntry,
    #[serde(default)]
    pub port_clips_prmi: CostEntry,
    #[serde(default)]
    pub attestation: CostEntry,
    #[serde(default)]
    pub cash_paid_commission: CostEntry,
    #[serde(default)]
    pub dubai_paid_invoice: CostEntry,
    #[serde(default = "usd_zero")]
    pub total_price_to_dubai: CurrencyAmount,
    pub date_arrived_in_dubai: Option<NaiveDate>,
    pub etd_from_usa: Option<NaiveDate>,
    #[serde(default)]
    pub container_number: String,
    #[serde(default)]
    pub booking_number: String,
}

fn usd_zero() -> CurrencyAmount {
    CurrencyAmount::usd(Decimal::ZERO)
}

impl Default for ShippingInput {
    fn default() -> Self {
        Self {
            commission: CostEntry::default(),
            clearing: CostEntry::default(),
            duty_vat: CostEntry::default(),
            delivery_order: CostEntry::default(),
            red_sea: CostEntry::default(),
            towing: CostEntry::default(),
            shipping: CostEntry::default(),
            port_clips_prmi: CostEntry::default(),
            attestation: CostEntry::default(),
            cash_paid_commission: CostEntry::default(),
            dubai_paid_invoice: CostEntry::default(),
            total_price_to_dubai: usd_zero(),
            date_arrived_in_dubai: None,
            etd_from_usa: None,
            container_number: String::new(),
            booking_number: String::new(),
        }
    }
}

impl Shipping {
    pub fn new(vehicle_id: VehicleId, input: ShippingInput) -> Self {
        let now = Utc::now();
        let mut shipping = Self {
            id: ShippingId::new_v7(),
            vehicle_id,
            commission: CostEntry::default(),
            clearing: CostEntry::default(),
            duty_vat: CostEntry::default(),
            delivery_order: CostEntry::default(),
            red_sea: CostEntry::default(),
            towing: CostEntry::default(),
            shipping: CostEntry::default(),
            port_clips_prmi: CostEntry::default(),
            attestation: CostEntry::default(),
            cash_paid_commission: CostEntry::default(),
            dubai_paid_invoice: CostEntry::default(),
            total_price_to_dubai: usd_zero(),
            date_arrived_in_dubai: None,
            etd_from_usa: None,
            container_number: String::new(),
            booking_number: String::new(),
            created_at: now,
            updated_at: now,
        };
        shipping.apply(input);
        shipping
    }

    /// Replaces the submitted fields, keeping identity and creation time
    pub fn apply(&mut self, input: ShippingInput) {
        self.commission = input.commission;
        self.clearing = input.clearing;
        self.duty_vat = input.duty_vat;
        self.delivery_order = input.delivery_order;
        self.red_sea = input.red_sea;
        self.towing = input.towing;
        self.shipping = input.shipping;
        self.port_clips_prmi = input.port_clips_prmi;
        self.attestation = input.attestation;
        self.cash_paid_commission = input.cash_paid_commission;
        self.dubai_paid_invoice = input.dubai_paid_invoice;
        self.total_price_to_dubai = input.total_price_to_dubai;
        self.date_arrived_in_dubai = input.date_arrived_in_dubai;
        self.etd_from_usa = input.etd_from_usa;
        self.container_number = input.container_number.trim().to_string();
        self.booking_number = input.booking_number.trim().to_string();
        self.updated_at = Utc::now();
    }

    /// The fees that make up the Dubai invoice
    pub fn invoice_fees(&self) -> [&CostEntry; 9] {
        [
            &self.commission,
            &self.clearing,
            &self.duty_vat,
            &self.delivery_order,
            &self.red_sea,
            &self.towing,
            &self.shipping,
            &self.port_clips_prmi,
            &self.attestation,
        ]
    }

    pub fn uses_currency(&self, code: &CurrencyCode) -> bool {
        self.invoice_fees().iter().any(|fee| fee.is_in(code))
            || self.cash_paid_commission.is_in(code)
            || self.dubai_paid_invoice.is_in(code)
            || self.total_price_to_dubai.is_in(code)
    }

    /// Sum of the invoice fees in base units
    pub fn invoice_total_dubai(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.invoice_fees()
            .iter()
            .map(|fee| fee.in_base(converter))
            .sum()
    }

    /// Part of the Dubai invoice not yet paid
    pub fn dubai_remain_invoice(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.invoice_total_dubai(converter) - self.dubai_paid_invoice.in_base(converter)
    }

    /// Invoice total plus the commission paid in cash
    pub fn cost_to_dubai(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.invoice_total_dubai(converter) + self.cash_paid_commission.in_base(converter)
    }

    /// Purchase price (when a purchase exists) plus everything spent to Dubai
    pub fn computed_total_price_to_dubai(
        &self,
        converter: &CurrencyConverter<'_>,
        purchase: Option<&Purchase>,
    ) -> Decimal {
        let purchase_in_base = purchase
            .map(|p| p.price_in_base(converter))
            .unwrap_or(Decimal::ZERO);
        purchase_in_base + self.cost_to_dubai(converter)
    }
}
