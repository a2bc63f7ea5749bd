//! Currency repository
//!
//! A rate change writes the history row and the updated currency in one
//! transaction. Setting a currency as base clears the flag on every other
//! row inside the same transaction, so the single-base index never trips.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use core_kernel::{CurrencyCode, CurrencyId, RateHistoryId};
use domain_currency::{Currency, ExchangeRateHistory};

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CurrencyRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub exchange_rate: Decimal,
    pub is_base: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CurrencyRow> for Currency {
    type Error = DatabaseError;

    fn try_from(row: CurrencyRow) -> Result<Self, Self::Error> {
        let code = CurrencyCode::parse(&row.code)
            .map_err(|e| DatabaseError::corrupt(format!("currency {}: {e}", row.id)))?;
        Ok(Currency {
            id: CurrencyId::from_uuid(row.id),
            code,
            name: row.name,
            symbol: row.symbol,
            exchange_rate: row.exchange_rate,
            is_base: row.is_base,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RateHistoryRow {
    pub id: Uuid,
    pub currency_id: Uuid,
    pub rate: Decimal,
    pub effective_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl From<RateHistoryRow> for ExchangeRateHistory {
    fn from(row: RateHistoryRow) -> Self {
        ExchangeRateHistory {
            id: RateHistoryId::from_uuid(row.id),
            currency_id: CurrencyId::from_uuid(row.currency_id),
            rate: row.rate,
            effective_date: row.effective_date,
            recorded_at: row.recorded_at,
        }
    }
}

const CURRENCY_COLUMNS: &str =
    "id, code, name, symbol, exchange_rate, is_base, is_active, created_at, updated_at";

/// Repository for currencies and their rate history
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    pool: PgPool,
}

impl CurrencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Currency>, DatabaseError> {
        let rows: Vec<CurrencyRow> =
            sqlx::query_as(&format!("SELECT {CURRENCY_COLUMNS} FROM currencies ORDER BY code"))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Currency::try_from).collect()
    }

    pub async fn get(&self, id: CurrencyId) -> Result<Currency, DatabaseError> {
        let row: Option<CurrencyRow> =
            sqlx::query_as(&format!("SELECT {CURRENCY_COLUMNS} FROM currencies WHERE id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await?;
        row.ok_or_else(|| DatabaseError::not_found("Currency", id))?
            .try_into()
    }

    pub async fn find_by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>, DatabaseError> {
        let row: Option<CurrencyRow> =
            sqlx::query_as(&format!("SELECT {CURRENCY_COLUMNS} FROM currencies WHERE code = $1"))
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Currency::try_from).transpose()
    }

    async fn clear_other_bases(
        tx: &mut Transaction<'_, Postgres>,
        keep: CurrencyId,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE currencies SET is_base = FALSE, updated_at = NOW() WHERE is_base AND id <> $1")
            .bind(Uuid::from(keep))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn insert(&self, currency: &Currency) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if currency.is_base {
            Self::clear_other_bases(&mut tx, currency.id).await?;
        }
        sqlx::query(
            r#"
            INSERT INTO currencies (id, code, name, symbol, exchange_rate, is_base, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::from(currency.id))
        .bind(currency.code.as_str())
        .bind(&currency.name)
        .bind(&currency.symbol)
        .bind(currency.exchange_rate)
        .bind(currency.is_base)
        .bind(currency.is_active)
        .bind(currency.created_at)
        .bind(currency.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Writes the currency and, when given, its new history row atomically
    pub async fn update(
        &self,
        currency: &Currency,
        history: Option<&ExchangeRateHistory>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        if currency.is_base {
            Self::clear_other_bases(&mut tx, currency.id).await?;
        }
        let result = sqlx::query(
            r#"
            UPDATE currencies
            SET code = $2, name = $3, symbol = $4, exchange_rate = $5,
                is_base = $6, is_active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(currency.id))
        .bind(currency.code.as_str())
        .bind(&currency.name)
        .bind(&currency.symbol)
        .bind(currency.exchange_rate)
        .bind(currency.is_base)
        .bind(currency.is_active)
        .bind(currency.updated_at)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Currency", currency.id));
        }

        if let Some(row) = history {
            sqlx::query(
                r#"
                INSERT INTO exchange_rate_history (id, currency_id, rate, effective_date, recorded_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::from(row.id))
            .bind(Uuid::from(row.currency_id))
            .bind(row.rate)
            .bind(row.effective_date)
            .bind(row.recorded_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, id: CurrencyId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM currencies WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Currency", id));
        }
        Ok(())
    }

    pub async fn clear_base_flag(&self, keep: CurrencyId) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        Self::clear_other_bases(&mut tx, keep).await?;
        tx.commit().await?;
        Ok(())
    }

    /// History of one currency, newest first
    pub async fn history(&self, id: CurrencyId) -> Result<Vec<ExchangeRateHistory>, DatabaseError> {
        let rows: Vec<RateHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, currency_id, rate, effective_date, recorded_at
            FROM exchange_rate_history
            WHERE currency_id = $1
            ORDER BY effective_date DESC, recorded_at DESC
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn all_history(&self) -> Result<Vec<ExchangeRateHistory>, DatabaseError> {
        let rows: Vec<RateHistoryRow> = sqlx::query_as(
            "SELECT id, currency_id, rate, effective_date, recorded_at FROM exchange_rate_history",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
