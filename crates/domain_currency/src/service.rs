//! Currency store operations

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use core_kernel::{CurrencyId, PortError};

use crate::currency::{Currency, CurrencyUpdate, ExchangeRateHistory, NewCurrency};
use crate::error::CurrencyError;
use crate::ports::{CurrencyPort, CurrencyPortExt, CurrencyUsagePort};
use crate::rate_book::RateBook;

/// Application service over the currency store
///
/// Keeps the store-wide rules: codes are unique, at most one currency is the
/// base and rate changes are recorded in history. Neither the base nor a
/// currency that recorded amounts are denominated in can be deleted.
#[derive(Clone)]
pub struct CurrencyService {
    port: Arc<dyn CurrencyPort>,
    usage: Arc<dyn CurrencyUsagePort>,
}

impl CurrencyService {
    pub fn new(port: Arc<dyn CurrencyPort>, usage: Arc<dyn CurrencyUsagePort>) -> Self {
        Self { port, usage }
    }

    pub fn port(&self) -> &Arc<dyn CurrencyPort> {
        &self.port
    }

    pub async fn list(&self) -> Result<Vec<Currency>, CurrencyError> {
        Ok(self.port.list_currencies().await?)
    }

    pub async fn get(&self, id: CurrencyId) -> Result<Currency, CurrencyError> {
        Ok(self.port.get_currency(id).await?)
    }

    pub async fn base_currency(&self) -> Result<Option<Currency>, CurrencyError> {
        Ok(self.port.base_currency().await?)
    }

    /// Creates a currency
    ///
    /// No history row is written for the initial rate.
    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create(&self, request: NewCurrency) -> Result<Currency, CurrencyError> {
        if self.port.find_by_code(&request.code).await?.is_some() {
            return Err(CurrencyError::conflict(format!(
                "currency code {} already exists",
                request.code
            )));
        }
        let currency = Currency::create(request)?;
        self.port.insert_currency(&currency).await?;
        if currency.is_base {
            self.port.clear_base_flag(currency.id).await?;
        }
        info!(currency_id = %currency.id, "currency created");
        Ok(currency)
    }

    /// Updates a currency, recording a rate change dated today
    pub async fn update(
        &self,
        id: CurrencyId,
        update: CurrencyUpdate,
    ) -> Result<Currency, CurrencyError> {
        self.update_on(id, update, Utc::now().date_naive()).await
    }

    /// Updates a currency, dating any rate change `today`
    #[instrument(skip(self, update))]
    pub async fn update_on(
        &self,
        id: CurrencyId,
        update: CurrencyUpdate,
        today: NaiveDate,
    ) -> Result<Currency, CurrencyError> {
        let mut currency = self.port.get_currency(id).await?;

        if let Some(code) = &update.code {
            if let Some(existing) = self.port.find_by_code(code).await? {
                if existing.id != id {
                    return Err(CurrencyError::conflict(format!(
                        "currency code {code} already exists"
                    )));
                }
            }
        }

        let history = currency.apply_update(update, today)?;
        self.port.update_currency(&currency, history.as_ref()).await?;
        if currency.is_base {
            self.port.clear_base_flag(currency.id).await?;
        }

        if let Some(row) = &history {
            info!(currency_id = %id, rate = %row.rate, effective = %row.effective_date, "exchange rate changed");
        } else {
            debug!(currency_id = %id, "currency updated");
        }
        Ok(currency)
    }

    /// Deletes a currency
    ///
    /// The base currency and any currency still used by a recorded amount
    /// are refused with a conflict.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CurrencyId) -> Result<(), CurrencyError> {
        let currency = self.port.get_currency(id).await?;
        if currency.is_base {
            return Err(CurrencyError::conflict(format!(
                "{} is the base currency and cannot be deleted",
                currency.code
            )));
        }
        if self.usage.is_currency_in_use(&currency.code).await? {
            return Err(CurrencyError::conflict(format!(
                "{} is used by recorded amounts and cannot be deleted",
                currency.code
            )));
        }
        self.port.delete_currency(id).await?;
        info!(currency_id = %id, "currency deleted");
        Ok(())
    }

    /// Returns the USD currency, creating it as the base when missing
    #[instrument(skip(self))]
    pub async fn ensure_base_currency(&self) -> Result<Currency, CurrencyError> {
        if let Some(usd) = self.port.find_by_code(&core_kernel::CurrencyCode::usd()).await? {
            return Ok(usd);
        }
        let usd = Currency::us_dollar();
        match self.port.insert_currency(&usd).await {
            Ok(()) => {}
            // created concurrently
            Err(PortError::Conflict { .. }) => {
                return self
                    .port
                    .find_by_code(&usd.code)
                    .await?
                    .ok_or_else(|| CurrencyError::not_found(&usd.code));
            }
            Err(err) => return Err(err.into()),
        }
        self.port.clear_base_flag(usd.id).await?;
        info!(currency_id = %usd.id, "seeded USD base currency");
        Ok(usd)
    }

    /// Rate history of one currency, newest first
    pub async fn rate_history(
        &self,
        id: CurrencyId,
    ) -> Result<Vec<ExchangeRateHistory>, CurrencyError> {
        self.port.get_currency(id).await?;
        Ok(self.port.rate_history(id).await?)
    }

    /// Loads a snapshot of currencies and history for conversion
    pub async fn rate_book(&self) -> Result<RateBook, CurrencyError> {
        Ok(self.port.load_rate_book().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{InMemoryCurrencyStore, InMemoryCurrencyUsage};
    use core_kernel::CurrencyCode;
    use rust_decimal_macros::dec;

    fn service() -> CurrencyService {
        service_with(InMemoryCurrencyUsage::new())
    }

    fn service_with(usage: InMemoryCurrencyUsage) -> CurrencyService {
        CurrencyService::new(Arc::new(InMemoryCurrencyStore::new()), Arc::new(usage))
    }

    fn aed(is_base: bool) -> NewCurrency {
        NewCurrency {
            code: CurrencyCode::parse("AED").unwrap(),
            name: "UAE Dirham".to_string(),
            symbol: "AED".to_string(),
            exchange_rate: dec!(0.2723),
            is_base,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_writes_no_history() {
        let service = service();
        let currency = service.create(aed(false)).await.unwrap();
        assert!(service.rate_history(currency.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_code_conflicts() {
        let service = service();
        service.create(aed(false)).await.unwrap();
        let err = service.create(aed(false)).await.unwrap_err();
        assert!(matches!(err, CurrencyError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_new_base_demotes_previous() {
        let service = service();
        let usd = service.ensure_base_currency().await.unwrap();
        let aed = service.create(aed(true)).await.unwrap();

        assert!(!service.get(usd.id).await.unwrap().is_base);
        assert_eq!(service.base_currency().await.unwrap().map(|c| c.id), Some(aed.id));
    }

    #[tokio::test]
    async fn test_ensure_base_currency_is_idempotent() {
        let service = service();
        let first = service.ensure_base_currency().await.unwrap();
        let second = service.ensure_base_currency().await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_currency_in_use_cannot_be_deleted() {
        let usage = InMemoryCurrencyUsage::new();
        let service = service_with(usage.clone());
        service.ensure_base_currency().await.unwrap();
        let aed = service.create(aed(false)).await.unwrap();
        usage.mark_in_use(aed.code.clone()).await;

        let err = service.delete(aed.id).await.unwrap_err();
        assert!(matches!(err, CurrencyError::Conflict(_)));
        assert_eq!(service.get(aed.id).await.unwrap().code.as_str(), "AED");
    }
}
