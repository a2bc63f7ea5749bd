//! Currency DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::CurrencyCode;
use domain_currency::{CurrencyUpdate, NewCurrency};

use crate::error::ApiError;

fn parse_code(value: &str) -> Result<CurrencyCode, ApiError> {
    CurrencyCode::parse(value).map_err(|e| ApiError::validation("code", e.to_string()))
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCurrencyRequest {
    #[validate(length(equal = 3, message = "must be exactly 3 letters"))]
    pub code: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5))]
    pub symbol: String,
    pub exchange_rate: Decimal,
    #[serde(default)]
    pub is_base: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CreateCurrencyRequest {
    pub fn into_new_currency(self) -> Result<NewCurrency, ApiError> {
        Ok(NewCurrency {
            code: parse_code(&self.code)?,
            name: self.name,
            symbol: self.symbol,
            exchange_rate: self.exchange_rate,
            is_base: self.is_base,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCurrencyRequest {
    #[validate(length(equal = 3, message = "must be exactly 3 letters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 5))]
    pub symbol: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub is_base: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateCurrencyRequest {
    pub fn into_update(self) -> Result<CurrencyUpdate, ApiError> {
        Ok(CurrencyUpdate {
            code: self.code.as_deref().map(parse_code).transpose()?,
            name: self.name,
            symbol: self.symbol,
            exchange_rate: self.exchange_rate,
            is_base: self.is_base,
            is_active: self.is_active,
        })
    }
}

/// `GET /currencies/convert` parameters
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: Decimal,
    pub currency: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub amount: Decimal,
    pub currency: Option<String>,
    pub date: Option<NaiveDate>,
    pub base_currency: Option<String>,
    pub amount_in_base: Decimal,
}
