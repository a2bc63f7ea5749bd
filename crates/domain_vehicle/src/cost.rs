//! Currency-tagged amounts recorded on ledger stages

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyCode, ValidationErrors};
use domain_currency::CurrencyConverter;

/// An amount with the currency it was paid in and the date it was paid
///
/// Each entry converts at its own date. A missing currency means the amount
/// is already in base units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CostEntry {
    pub fn new(amount: Decimal, currency: Option<CurrencyCode>, date: Option<NaiveDate>) -> Self {
        Self { amount, currency, date }
    }

    /// An amount already in base units with no date
    pub fn base(amount: Decimal) -> Self {
        Self {
            amount,
            currency: None,
            date: None,
        }
    }

    pub fn in_base(&self, converter: &CurrencyConverter<'_>) -> Decimal {
        converter.convert_to_base(Some(self.amount), self.currency.as_ref(), self.date)
    }

    pub fn is_in(&self, code: &CurrencyCode) -> bool {
        self.currency.as_ref() == Some(code)
    }
}

/// An amount with its currency, dated by a sibling field of the owning record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
}

impl CurrencyAmount {
    pub fn new(amount: Decimal, currency: Option<CurrencyCode>) -> Self {
        Self { amount, currency }
    }

    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount,
            currency: Some(CurrencyCode::usd()),
        }
    }

    pub fn in_base_on(&self, converter: &CurrencyConverter<'_>, date: Option<NaiveDate>) -> Decimal {
        converter.convert_to_base(Some(self.amount), self.currency.as_ref(), date)
    }

    pub fn is_in(&self, code: &CurrencyCode) -> bool {
        self.currency.as_ref() == Some(code)
    }
}

/// A balance still owed on a stage, with the date it is due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outstanding {
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// The submitted form of an optional outstanding balance
///
/// When `has_remaining` is false the amount and date are discarded whatever
/// was submitted. When it is true both are required and a zero amount counts
/// as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutstandingInput {
    pub has_remaining: bool,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl OutstandingInput {
    pub fn new(has_remaining: bool, amount: Option<Decimal>, date: Option<NaiveDate>) -> Self {
        Self {
            has_remaining,
            amount,
            date,
        }
    }

    /// Resolves to the stored balance, recording missing fields in `errors`
    pub fn resolve(
        self,
        amount_field: &str,
        date_field: &str,
        errors: &mut ValidationErrors,
    ) -> Option<Outstanding> {
        if !self.has_remaining {
            return None;
        }
        let amount = self.amount.filter(|a| !a.is_zero());
        if amount.is_none() {
            errors.add(amount_field, "required when a balance remains");
        }
        if self.date.is_none() {
            errors.add(date_field, "required when a balance remains");
        }
        Some(Outstanding {
            amount: amount?,
            date: self.date?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flag_off_discards_submitted_values() {
        let mut errors = ValidationErrors::new();
        let input = OutstandingInput::new(false, Some(dec!(500)), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(input.resolve("amount", "date", &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_flag_on_requires_both_fields() {
        let mut errors = ValidationErrors::new();
        let input = OutstandingInput::new(true, Some(dec!(0)), None);
        assert_eq!(input.resolve("remaining_gomrok", "remaining_gomrok_date", &mut errors), None);
        assert!(errors.has_field("remaining_gomrok"));
        assert!(errors.has_field("remaining_gomrok_date"));
    }

    #[test]
    fn test_flag_on_with_values() {
        let mut errors = ValidationErrors::new();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let input = OutstandingInput::new(true, Some(dec!(250)), Some(date));
        assert_eq!(
            input.resolve("amount", "date", &mut errors),
            Some(Outstanding { amount: dec!(250), date })
        );
        assert!(errors.is_empty());
    }
}
