//! Property-Based Test Generators
//!
//! proptest strategies for amounts, rates, dates and currency-tagged costs.

use chrono::{Duration, NaiveDate};
use core_kernel::CurrencyCode;
use domain_vehicle::{CostEntry, CurrencyAmount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::fixtures::{code, date};

/// Non-negative amounts with two decimal places, up to 1,000,000.00
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive exchange rates with six decimal places, up to 10
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|micros| Decimal::new(micros, 6))
}

/// Dates spread over 2022 to 2025
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..1460i64).prop_map(|days| date(2022, 1, 1) + Duration::days(days))
}

/// Codes of the standard fixture currencies, or none
pub fn fixture_code_strategy() -> impl Strategy<Value = Option<CurrencyCode>> {
    prop_oneof![
        Just(None),
        Just(Some(code("USD"))),
        Just(Some(code("AED"))),
    ]
}

/// Any syntactically valid three-letter code
pub fn currency_code_strategy() -> impl Strategy<Value = CurrencyCode> {
    "[A-Z]{3}".prop_map(|s| code(&s))
}

/// A cost in a fixture currency, with or without a date
pub fn cost_entry_strategy() -> impl Strategy<Value = CostEntry> {
    (amount_strategy(), fixture_code_strategy(), proptest::option::of(date_strategy()))
        .prop_map(|(amount, currency, date)| CostEntry::new(amount, currency, date))
}

/// An amount in a fixture currency
pub fn currency_amount_strategy() -> impl Strategy<Value = CurrencyAmount> {
    (amount_strategy(), fixture_code_strategy())
        .prop_map(|(amount, currency)| CurrencyAmount::new(amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_amounts_are_non_negative(amount in amount_strategy()) {
            prop_assert!(amount >= Decimal::ZERO);
            prop_assert!(amount.scale() == 2);
        }

        #[test]
        fn prop_rates_are_positive(rate in rate_strategy()) {
            prop_assert!(rate > Decimal::ZERO);
        }

        #[test]
        fn prop_dates_in_range(d in date_strategy()) {
            prop_assert!(d >= date(2022, 1, 1));
            prop_assert!(d < date(2026, 1, 1));
        }
    }
}
