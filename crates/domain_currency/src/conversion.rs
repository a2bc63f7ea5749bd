//! Monetary conversion into the base currency
//!
//! Conversion never fails. A missing amount is zero, an amount without a
//! currency or in the base currency is returned unchanged, and a rate that
//! has no history on or before the requested date falls back to the
//! currency's current rate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use core_kernel::{CurrencyCode, Money};

use crate::rate_book::RateSource;

/// Stateless conversion capability shared by every ledger stage
#[derive(Clone, Copy)]
pub struct CurrencyConverter<'a> {
    rates: &'a dyn RateSource,
}

impl<'a> CurrencyConverter<'a> {
    pub fn new(rates: &'a dyn RateSource) -> Self {
        Self { rates }
    }

    /// The code all converted amounts are expressed in
    pub fn base_code(&self) -> Option<&'a CurrencyCode> {
        self.rates.base_code()
    }

    /// Converts `amount` recorded in `currency` on `as_of` into base units
    pub fn convert_to_base(
        &self,
        amount: Option<Decimal>,
        currency: Option<&CurrencyCode>,
        as_of: Option<NaiveDate>,
    ) -> Decimal {
        let Some(amount) = amount else {
            return Decimal::ZERO;
        };
        let Some(code) = currency else {
            return amount;
        };
        if self.rates.is_base(code) {
            return amount;
        }
        match self.rates.rate_at(code, as_of) {
            Some(rate) => amount * rate,
            None => {
                warn!(currency = %code, "unknown currency, amount taken as base");
                amount
            }
        }
    }

    /// Converts a [`Money`] value on `as_of`
    pub fn convert_money(&self, money: &Money, as_of: Option<NaiveDate>) -> Decimal {
        self.convert_to_base(Some(money.amount()), Some(money.currency()), as_of)
    }
}

impl std::fmt::Debug for CurrencyConverter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("base", &self.rates.base_code())
            .finish()
    }
}
