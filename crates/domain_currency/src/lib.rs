//! Currency Store Domain
//!
//! Currencies are maintained by hand: each has a current exchange rate into
//! the single base currency, and every later change of that rate is kept in
//! an append-only history so back-dated amounts convert at the rate that was
//! in effect on their date.
//!
//! # Key Concepts
//!
//! - **Currency**: a code with its current rate in base units
//! - **ExchangeRateHistory**: one recorded rate change, dated the day it was made
//! - **RateBook**: a loaded snapshot of currencies and history
//! - **CurrencyConverter**: converts `(amount, currency, date)` into base units
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use core_kernel::CurrencyCode;
//! use domain_currency::{Currency, CurrencyConverter, ExchangeRateHistory, RateBook};
//! use rust_decimal_macros::dec;
//!
//! let usd = Currency::us_dollar();
//! let mut aed = Currency::us_dollar();
//! aed.id = core_kernel::CurrencyId::new();
//! aed.code = CurrencyCode::parse("AED").unwrap();
//! aed.exchange_rate = dec!(0.28);
//! aed.is_base = false;
//!
//! let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history = vec![ExchangeRateHistory::new(aed.id, dec!(0.27), jan)];
//! let book = RateBook::new(vec![usd, aed], history);
//! let converter = CurrencyConverter::new(&book);
//!
//! let aed_code = CurrencyCode::parse("AED").unwrap();
//! assert_eq!(converter.convert_to_base(Some(dec!(100)), Some(&aed_code), Some(jan)), dec!(27));
//! assert_eq!(converter.convert_to_base(Some(dec!(100)), Some(&aed_code), None), dec!(28));
//! ```

pub mod currency;
pub mod rate_book;
pub mod conversion;
pub mod error;
pub mod ports;
pub mod service;

pub use currency::{Currency, CurrencyUpdate, ExchangeRateHistory, NewCurrency};
pub use rate_book::{RateBook, RateSource};
pub use conversion::CurrencyConverter;
pub use error::CurrencyError;
pub use ports::{CurrencyPort, CurrencyPortExt, CurrencyUsagePort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{InMemoryCurrencyStore, InMemoryCurrencyUsage};
pub use service::CurrencyService;
