//! Point-in-time snapshot of the currency store used for conversion

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::{CurrencyCode, CurrencyId};

use crate::currency::{Currency, ExchangeRateHistory};

/// Read access to exchange rates
///
/// Conversion only needs to know which currency is the base and which rate
/// applies to a code on a date. Keeping that behind a trait lets the
/// converter run against a loaded [`RateBook`] or any other source.
pub trait RateSource: Send + Sync {
    /// The designated base currency, if one exists
    fn base_code(&self) -> Option<&CurrencyCode>;

    /// Rate of `code` in base units effective on `as_of`
    ///
    /// Returns `None` for codes the source does not know.
    fn rate_at(&self, code: &CurrencyCode, as_of: Option<NaiveDate>) -> Option<Decimal>;

    fn is_base(&self, code: &CurrencyCode) -> bool {
        self.base_code() == Some(code)
    }
}

#[derive(Debug, Clone)]
struct RateEntry {
    current: Decimal,
    /// Sorted by (effective_date desc, recorded_at desc)
    history: Vec<ExchangeRateHistory>,
}

/// An immutable snapshot of currencies and their rate history
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    base: Option<CurrencyCode>,
    entries: HashMap<CurrencyCode, RateEntry>,
}

impl RateBook {
    /// Builds a snapshot from currencies and the full history table
    ///
    /// History rows for currencies not in `currencies` are ignored.
    pub fn new(currencies: Vec<Currency>, history: Vec<ExchangeRateHistory>) -> Self {
        let mut by_id: HashMap<CurrencyId, Vec<ExchangeRateHistory>> = HashMap::new();
        for row in history {
            by_id.entry(row.currency_id).or_default().push(row);
        }

        let mut base = None;
        let mut entries = HashMap::with_capacity(currencies.len());
        for currency in currencies {
            if currency.is_base {
                base = Some(currency.code.clone());
            }
            let mut history = by_id.remove(&currency.id).unwrap_or_default();
            history.sort_by(|a, b| {
                b.effective_date
                    .cmp(&a.effective_date)
                    .then(b.recorded_at.cmp(&a.recorded_at))
            });
            entries.insert(
                currency.code,
                RateEntry {
                    current: currency.exchange_rate,
                    history,
                },
            );
        }

        Self { base, entries }
    }

    /// Number of currencies in the snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.entries.contains_key(code)
    }
}

impl RateSource for RateBook {
    fn base_code(&self) -> Option<&CurrencyCode> {
        self.base.as_ref()
    }

    fn rate_at(&self, code: &CurrencyCode, as_of: Option<NaiveDate>) -> Option<Decimal> {
        let entry = self.entries.get(code)?;
        let historical = as_of.and_then(|date| {
            entry
                .history
                .iter()
                .find(|row| row.effective_date <= date)
                .map(|row| row.rate)
        });
        Some(historical.unwrap_or(entry.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn currency(c: &str, rate: Decimal, is_base: bool) -> Currency {
        let mut currency = Currency::us_dollar();
        currency.id = CurrencyId::new();
        currency.code = code(c);
        currency.exchange_rate = rate;
        currency.is_base = is_base;
        currency
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_history_lookup_picks_latest_on_or_before_date() {
        let aed = currency("AED", dec!(0.2723), false);
        let history = vec![
            ExchangeRateHistory::new(aed.id, dec!(0.27), date(1, 1)),
            ExchangeRateHistory::new(aed.id, dec!(0.271), date(3, 1)),
            ExchangeRateHistory::new(aed.id, dec!(0.2723), date(6, 1)),
        ];
        let book = RateBook::new(vec![aed], history);

        assert_eq!(book.rate_at(&code("AED"), Some(date(3, 1))), Some(dec!(0.271)));
        assert_eq!(book.rate_at(&code("AED"), Some(date(5, 31))), Some(dec!(0.271)));
        assert_eq!(book.rate_at(&code("AED"), Some(date(1, 15))), Some(dec!(0.27)));
    }

    #[test]
    fn test_falls_back_to_current_rate() {
        let aed = currency("AED", dec!(0.2723), false);
        let history = vec![ExchangeRateHistory::new(aed.id, dec!(0.27), date(3, 1))];
        let book = RateBook::new(vec![aed], history);

        // before any history
        assert_eq!(book.rate_at(&code("AED"), Some(date(2, 1))), Some(dec!(0.2723)));
        // no date given
        assert_eq!(book.rate_at(&code("AED"), None), Some(dec!(0.2723)));
    }

    #[test]
    fn test_same_day_tie_broken_by_recorded_at() {
        let afn = currency("AFN", dec!(0.015), false);
        let mut earlier = ExchangeRateHistory::new(afn.id, dec!(0.013), date(4, 1));
        earlier.recorded_at = Utc::now() - Duration::hours(2);
        let later = ExchangeRateHistory::new(afn.id, dec!(0.014), date(4, 1));
        let book = RateBook::new(vec![afn], vec![later, earlier]);

        assert_eq!(book.rate_at(&code("AFN"), Some(date(4, 2))), Some(dec!(0.014)));
    }

    #[test]
    fn test_unknown_code_has_no_rate() {
        let book = RateBook::new(vec![currency("USD", dec!(1), true)], vec![]);
        assert_eq!(book.rate_at(&code("EUR"), None), None);
        assert!(book.is_base(&code("USD")));
        assert!(!book.is_base(&code("EUR")));
    }
}
