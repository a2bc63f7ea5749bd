//! Pre-built Test Fixtures
//!
//! Consistent currencies and dates for tests. Amounts in the ledger tests are
//! chosen so every converted figure is exact at these rates.

use chrono::NaiveDate;
use core_kernel::CurrencyCode;
use domain_currency::{Currency, ExchangeRateHistory, NewCurrency};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Parses a currency code known to be valid
pub fn code(value: &str) -> CurrencyCode {
    CurrencyCode::parse(value).unwrap()
}

/// Builds a calendar date known to be valid
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Fixture for currencies
pub struct CurrencyFixtures;

impl CurrencyFixtures {
    /// USD, base, rate 1
    pub fn usd() -> Currency {
        Currency::us_dollar()
    }

    /// UAE Dirham at 0.28 USD
    pub fn aed() -> Currency {
        Self::currency("AED", "UAE Dirham", "AED", dec!(0.28))
    }

    /// Afghani at 0.014 USD
    pub fn afn() -> Currency {
        Self::currency("AFN", "Afghani", "؋", dec!(0.014))
    }

    /// A non-base active currency
    pub fn currency(code_value: &str, name: &str, symbol: &str, rate: Decimal) -> Currency {
        Currency::create(NewCurrency {
            code: code(code_value),
            name: name.to_string(),
            symbol: symbol.to_string(),
            exchange_rate: rate,
            is_base: false,
            is_active: true,
        })
        .unwrap()
    }

    /// AED at 0.27 effective from 2024-01-01
    pub fn aed_history(aed: &Currency) -> ExchangeRateHistory {
        ExchangeRateHistory::new(aed.id, dec!(0.27), DateFixtures::rate_change())
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Effective date of the seeded AED history row
    pub fn rate_change() -> NaiveDate {
        date(2024, 1, 1)
    }

    /// Before any seeded history row
    pub fn before_history() -> NaiveDate {
        date(2023, 6, 1)
    }

    /// A typical purchase date
    pub fn purchase() -> NaiveDate {
        date(2024, 3, 10)
    }

    /// A typical sale date
    pub fn sale() -> NaiveDate {
        date(2024, 8, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_currencies_are_not_base() {
        assert!(CurrencyFixtures::usd().is_base);
        assert!(!CurrencyFixtures::aed().is_base);
        assert_eq!(CurrencyFixtures::afn().code, code("AFN"));
    }

    #[test]
    fn test_history_precedes_purchase() {
        assert!(DateFixtures::rate_change() < DateFixtures::purchase());
        assert!(DateFixtures::before_history() < DateFixtures::rate_change());
    }
}
