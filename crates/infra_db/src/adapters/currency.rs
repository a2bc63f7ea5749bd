//! PostgreSQL currency adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    CurrencyCode, CurrencyId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_currency::{Currency, CurrencyPort, ExchangeRateHistory};

use crate::repositories::CurrencyRepository;

/// `CurrencyPort` backed by the `currencies` and `exchange_rate_history` tables
#[derive(Debug, Clone)]
pub struct PostgresCurrencyAdapter {
    repository: CurrencyRepository,
    pool: PgPool,
}

impl PostgresCurrencyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CurrencyRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresCurrencyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCurrencyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-currency-adapter").await
    }
}

#[async_trait]
impl CurrencyPort for PostgresCurrencyAdapter {
    async fn list_currencies(&self) -> Result<Vec<Currency>, PortError> {
        Ok(self.repository.list().await?)
    }

    async fn get_currency(&self, id: CurrencyId) -> Result<Currency, PortError> {
        Ok(self.repository.get(id).await?)
    }

    async fn find_by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>, PortError> {
        Ok(self.repository.find_by_code(code).await?)
    }

    #[instrument(skip(self, currency), fields(code = %currency.code))]
    async fn insert_currency(&self, currency: &Currency) -> Result<(), PortError> {
        self.repository.insert(currency).await?;
        debug!(id = %currency.id, "currency inserted");
        Ok(())
    }

    #[instrument(skip(self, currency, history), fields(code = %currency.code))]
    async fn update_currency(
        &self,
        currency: &Currency,
        history: Option<&ExchangeRateHistory>,
    ) -> Result<(), PortError> {
        self.repository.update(currency, history).await?;
        debug!(rate_recorded = history.is_some(), "currency updated");
        Ok(())
    }

    async fn delete_currency(&self, id: CurrencyId) -> Result<(), PortError> {
        Ok(self.repository.delete(id).await?)
    }

    async fn clear_base_flag(&self, keep: CurrencyId) -> Result<(), PortError> {
        Ok(self.repository.clear_base_flag(keep).await?)
    }

    async fn rate_history(&self, id: CurrencyId) -> Result<Vec<ExchangeRateHistory>, PortError> {
        Ok(self.repository.history(id).await?)
    }

    async fn all_rate_history(&self) -> Result<Vec<ExchangeRateHistory>, PortError> {
        Ok(self.repository.all_history().await?)
    }
}
