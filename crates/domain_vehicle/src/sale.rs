//! Sale reconciliation and buyers
//!
//! Until a vehicle is sold its sale price is a live valuation: every save
//! overwrites it with the accumulated final cost. Once sold, the price is a
//! real transaction and the benefit is reconciled against the final cost.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BuyerId, CurrencyCode, Rate, SaleId, ValidationErrors, VehicleId};
use domain_currency::CurrencyConverter;

use crate::cost::CurrencyAmount;

/// Share of the sale price taken as commission
pub const SALE_COMMISSION_RATE: Rate = Rate::new(dec!(0.02));

/// Flat fee added to the commission, in base units
pub const SALE_FLAT_FEE: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    ReadyForSale,
    Sold,
    InTransit,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::ReadyForSale => "ready_for_sale",
            SaleStatus::Sold => "sold",
            SaleStatus::InTransit => "in_transit",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready_for_sale" => Ok(SaleStatus::ReadyForSale),
            "sold" => Ok(SaleStatus::Sold),
            "in_transit" => Ok(SaleStatus::InTransit),
            other => Err(format!("unknown sale status: {other}")),
        }
    }
}

/// Sale record of a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleInfo {
    pub id: SaleId,
    pub vehicle_id: VehicleId,
    pub status: SaleStatus,
    pub buyer_id: Option<BuyerId>,
    pub sale_price: CurrencyAmount,
    pub sale_date: Option<NaiveDate>,
    pub remaining_price_of_buyer: Decimal,
    pub buyer_remain_payment_date: Option<NaiveDate>,
    /// Free text; has no effect on the benefit split
    pub split_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted sale fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleInput {
    #[serde(default)]
    pub status: SaleStatus,
    pub buyer_id: Option<BuyerId>,
    #[serde(default)]
    pub sale_price: CurrencyAmount,
    pub sale_date: Option<NaiveDate>,
    #[serde(default)]
    pub remaining_price_of_buyer: Decimal,
    pub buyer_remain_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub split_note: String,
}

/// Reconciliation figures of a sale, in base units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    pub sale_price_in_base: Decimal,
    pub sale_commission: Decimal,
    pub special_sale_price: Decimal,
    pub repair_final_cost: Decimal,
    pub benefit: Decimal,
    pub benefit_person_1: Decimal,
    pub benefit_person_2: Decimal,
    /// Capital still tied up in the vehicle
    pub capital_bound: Decimal,
}

impl SaleInfo {
    pub fn new(vehicle_id: VehicleId, input: SaleInput) -> Self {
        let now = Utc::now();
        Self {
            id: SaleId::new_v7(),
            vehicle_id,
            status: input.status,
            buyer_id: input.buyer_id,
            sale_price: input.sale_price,
            sale_date: input.sale_date,
            remaining_price_of_buyer: input.remaining_price_of_buyer,
            buyer_remain_payment_date: input.buyer_remain_payment_date,
            split_note: input.split_note.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the submitted fields, keeping identity and creation time
    pub fn apply(&mut self, input: SaleInput) {
        self.status = input.status;
        self.buyer_id = input.buyer_id;
        self.sale_price = input.sale_price;
        self.sale_date = input.sale_date;
        self.remaining_price_of_buyer = input.remaining_price_of_buyer;
        self.buyer_remain_payment_date = input.buyer_remain_payment_date;
        self.split_note = input.split_note.trim().to_string();
        self.updated_at = Utc::now();
    }

    pub fn is_sold(&self) -> bool {
        self.status == SaleStatus::Sold
    }

    /// A sold vehicle needs a positive price, a sale date and a buyer
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.is_sold() {
            if self.sale_price.amount.is_zero() {
                errors.add("sale_price", "required for sold vehicles");
            } else if self.sale_price.amount < Decimal::ZERO {
                errors.add("sale_price", "must be positive for sold vehicles");
            }
            if self.sale_date.is_none() {
                errors.add("sale_date", "required for sold vehicles");
            }
            if self.buyer_id.is_none() {
                errors.add("buyer_id", "required for sold vehicles");
            }
        }
        errors.into_result()
    }

    /// Save-time valuation of unsold stock
    ///
    /// The price becomes the final cost of the repair stage (zero when that
    /// stage does not exist), expressed in the base currency. Without a base
    /// currency the code is cleared, which reads as base units.
    pub fn sync_valuation(&mut self, final_cost: Option<Decimal>, base: Option<&CurrencyCode>) {
        if self.is_sold() {
            return;
        }
        self.sale_price.amount = final_cost.unwrap_or(Decimal::ZERO);
        self.sale_price.currency = base.cloned();
    }

    pub fn uses_currency(&self, code: &CurrencyCode) -> bool {
        self.sale_price.is_in(code)
    }

    pub fn sale_price_in_base(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        self.sale_price.in_base_on(converter, self.sale_date)
    }

    /// Reconciles the sale against the final cost
    ///
    /// Every figure except `capital_bound` is zero until the vehicle is sold.
    pub fn summary(&self, converter: &CurrencyConverter<'_>, final_cost: Option<Decimal>) -> SaleSummary {
        let repair_final_cost = final_cost.unwrap_or(Decimal::ZERO);
        if !self.is_sold() {
            return SaleSummary {
                repair_final_cost,
                capital_bound: repair_final_cost,
                ..SaleSummary::default()
            };
        }

        let sale_price_in_base = self.sale_price_in_base(converter);
        let sale_commission = SALE_COMMISSION_RATE.apply(sale_price_in_base) + SALE_FLAT_FEE;
        let special_sale_price = sale_price_in_base - sale_commission;
        let benefit = special_sale_price - repair_final_cost;
        let half = benefit / dec!(2);

        SaleSummary {
            sale_price_in_base,
            sale_commission,
            special_sale_price,
            repair_final_cost,
            benefit,
            benefit_person_1: half,
            benefit_person_2: half,
            capital_bound: Decimal::ZERO,
        }
    }
}

/// A reusable buyer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub id: BuyerId,
    pub name: String,
    pub contact_info: String,
    pub address: String,
    pub national_id: String,
    pub additional_info: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBuyer {
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub additional_info: String,
}

impl NewBuyer {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        } else if self.name.chars().count() > 255 {
            errors.add("name", "must be at most 255 characters");
        }
        if self.national_id.chars().count() > 20 {
            errors.add("national_id", "must be at most 20 characters");
        }
        errors.into_result()
    }
}

impl Buyer {
    pub fn create(request: NewBuyer) -> Result<Self, ValidationErrors> {
        let mut buyer = Self {
            id: BuyerId::new_v7(),
            name: String::new(),
            contact_info: String::new(),
            address: String::new(),
            national_id: String::new(),
            additional_info: String::new(),
            created_at: Utc::now(),
        };
        buyer.apply(request)?;
        Ok(buyer)
    }

    pub fn apply(&mut self, request: NewBuyer) -> Result<(), ValidationErrors> {
        request.validate()?;
        self.name = request.name.trim().to_string();
        self.contact_info = request.contact_info;
        self.address = request.address;
        self.national_id = request.national_id.trim().to_string();
        self.additional_info = request.additional_info;
        Ok(())
    }

    /// Case-insensitive match on a fragment of the name
    pub fn name_matches(&self, fragment: &str) -> bool {
        self.name.to_lowercase().contains(&fragment.trim().to_lowercase())
    }
}
