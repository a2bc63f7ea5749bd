//! Currencies and their exchange rate history

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, CurrencyId, RateHistoryId, ValidationErrors};

/// A currency the business trades in
///
/// `exchange_rate` is the value of one unit of this currency expressed in
/// base currency units. At most one currency is the base at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    pub code: CurrencyCode,
    pub name: String,
    pub symbol: String,
    pub exchange_rate: Decimal,
    pub is_base: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    /// Builds a currency from a validated creation request
    ///
    /// Creation never records rate history; only later rate changes do.
    pub fn create(request: NewCurrency) -> Result<Self, ValidationErrors> {
        request.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: CurrencyId::new_v7(),
            code: request.code,
            name: request.name.trim().to_string(),
            symbol: request.symbol.trim().to_string(),
            exchange_rate: request.exchange_rate,
            is_base: request.is_base,
            is_active: request.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// The default base currency of a fresh installation
    pub fn us_dollar() -> Self {
        let now = Utc::now();
        Self {
            id: CurrencyId::new_v7(),
            code: CurrencyCode::usd(),
            name: "US Dollar".to_string(),
            symbol: "$".to_string(),
            exchange_rate: dec!(1),
            is_base: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an update, returning the history entry to persist when the
    /// exchange rate actually changed
    ///
    /// The entry is dated `today` and carries the new rate. The comparison is
    /// against the value held before the update, so re-submitting the current
    /// rate records nothing.
    pub fn apply_update(
        &mut self,
        update: CurrencyUpdate,
        today: NaiveDate,
    ) -> Result<Option<ExchangeRateHistory>, ValidationErrors> {
        update.validate()?;

        let mut history = None;
        if let Some(rate) = update.exchange_rate {
            if rate != self.exchange_rate {
                history = Some(ExchangeRateHistory::new(self.id, rate, today));
                self.exchange_rate = rate;
            }
        }
        if let Some(code) = update.code {
            self.code = code;
        }
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(symbol) = update.symbol {
            self.symbol = symbol.trim().to_string();
        }
        if let Some(is_base) = update.is_base {
            self.is_base = is_base;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();

        Ok(history)
    }
}

/// One recorded exchange rate change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateHistory {
    pub id: RateHistoryId,
    pub currency_id: CurrencyId,
    pub rate: Decimal,
    pub effective_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl ExchangeRateHistory {
    pub fn new(currency_id: CurrencyId, rate: Decimal, effective_date: NaiveDate) -> Self {
        Self {
            id: RateHistoryId::new_v7(),
            currency_id,
            rate,
            effective_date,
            recorded_at: Utc::now(),
        }
    }
}

/// Request for creating a currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCurrency {
    pub code: CurrencyCode,
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    pub exchange_rate: Decimal,
    #[serde(default)]
    pub is_base: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewCurrency {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "must not be blank");
        }
        if self.symbol.chars().count() > 5 {
            errors.add("symbol", "must be at most 5 characters");
        }
        if self.exchange_rate <= Decimal::ZERO {
            errors.add("exchange_rate", "must be greater than zero");
        }
        errors.into_result()
    }
}

/// Partial update of a currency; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyUpdate {
    pub code: Option<CurrencyCode>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub is_base: Option<bool>,
    pub is_active: Option<bool>,
}

impl CurrencyUpdate {
    /// Update that only changes the exchange rate
    pub fn rate(exchange_rate: Decimal) -> Self {
        Self {
            exchange_rate: Some(exchange_rate),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            errors.add("name", "must not be blank");
        }
        if matches!(&self.symbol, Some(symbol) if symbol.chars().count() > 5) {
            errors.add("symbol", "must be at most 5 characters");
        }
        if matches!(self.exchange_rate, Some(rate) if rate <= Decimal::ZERO) {
            errors.add("exchange_rate", "must be greater than zero");
        }
        errors.into_result()
    }
}
