//! Repository implementations for the ledger tables
//!
//! Repositories own the SQL and map between rows and domain types. Stage
//! tables store every currency-tagged cost as three columns,
//! `{name}_amount`, `{name}_currency` and `{name}_date`; the helpers below
//! read and bind those groups.

pub mod currency;
pub mod vehicle;
pub mod stages;
pub mod catalog;

pub use currency::CurrencyRepository;
pub use vehicle::VehicleRepository;
pub use stages::StageRepository;
pub use catalog::CatalogRepository;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use core_kernel::CurrencyCode;
use domain_vehicle::{CostEntry, CurrencyAmount, Outstanding};

use crate::error::DatabaseError;

pub(crate) type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

pub(crate) fn parse_code(value: Option<String>) -> Result<Option<CurrencyCode>, DatabaseError> {
    value
        .map(|code| {
            CurrencyCode::parse(&code)
                .map_err(|e| DatabaseError::corrupt(format!("currency code {code:?}: {e}")))
        })
        .transpose()
}

fn code_text(code: Option<&CurrencyCode>) -> Option<String> {
    code.map(|c| c.as_str().to_string())
}

pub(crate) fn cost_entry(row: &PgRow, name: &str) -> Result<CostEntry, DatabaseError> {
    Ok(CostEntry {
        amount: row.try_get(format!("{name}_amount").as_str())?,
        currency: parse_code(row.try_get(format!("{name}_currency").as_str())?)?,
        date: row.try_get(format!("{name}_date").as_str())?,
    })
}

pub(crate) fn currency_amount(row: &PgRow, name: &str) -> Result<CurrencyAmount, DatabaseError> {
    Ok(CurrencyAmount {
        amount: row.try_get(format!("{name}_amount").as_str())?,
        currency: parse_code(row.try_get(format!("{name}_currency").as_str())?)?,
    })
}

/// Reads an optional balance stored as an amount column and a date column
pub(crate) fn outstanding(
    row: &PgRow,
    amount: &str,
    date: &str,
) -> Result<Option<Outstanding>, DatabaseError> {
    let amount: Option<Decimal> = row.try_get(amount)?;
    let date: Option<NaiveDate> = row.try_get(date)?;
    Ok(amount.zip(date).map(|(amount, date)| Outstanding { amount, date }))
}

pub(crate) fn bind_cost<'q>(query: PgQuery<'q>, entry: &CostEntry) -> PgQuery<'q> {
    query
        .bind(entry.amount)
        .bind(code_text(entry.currency.as_ref()))
        .bind(entry.date)
}

pub(crate) fn bind_amount<'q>(query: PgQuery<'q>, value: &CurrencyAmount) -> PgQuery<'q> {
    query.bind(value.amount).bind(code_text(value.currency.as_ref()))
}

pub(crate) fn bind_outstanding<'q>(query: PgQuery<'q>, value: Option<&Outstanding>) -> PgQuery<'q> {
    query
        .bind(value.map(|o| o.amount))
        .bind(value.map(|o| o.date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_code_passes_through_none() {
        assert_eq!(parse_code(None).unwrap(), None);
        assert_eq!(parse_code(Some("aed".to_string())).unwrap(), Some(CurrencyCode::parse("AED").unwrap()));
    }

    #[test]
    fn test_parse_code_rejects_garbage() {
        let err = parse_code(Some("12".to_string())).unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptRow(_)));
    }
}
