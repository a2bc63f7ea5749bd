//! Currency Domain Ports
//!
//! The `CurrencyPort` trait is everything the currency domain needs from its
//! store. The PostgreSQL adapter lives in `infra_db`; an in-memory store is
//! available under the `mock` feature for tests.

use async_trait::async_trait;

use core_kernel::{CurrencyCode, CurrencyId, DomainPort, HealthCheckable, PortError};

use crate::currency::{Currency, ExchangeRateHistory};
use crate::rate_book::RateBook;

/// Port for currencies and their exchange rate history
#[async_trait]
pub trait CurrencyPort: DomainPort + HealthCheckable {
    /// Lists every currency ordered by code
    async fn list_currencies(&self) -> Result<Vec<Currency>, PortError>;

    /// Retrieves a currency by id, or `PortError::NotFound`
    async fn get_currency(&self, id: CurrencyId) -> Result<Currency, PortError>;

    /// Finds a currency by its code
    async fn find_by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>, PortError>;

    /// Persists a new currency
    ///
    /// Returns `PortError::Conflict` if the code is already taken.
    async fn insert_currency(&self, currency: &Currency) -> Result<(), PortError>;

    /// Persists changes to an existing currency
    ///
    /// When `history` is present it is appended in the same unit of work.
    async fn update_currency(
        &self,
        currency: &Currency,
        history: Option<&ExchangeRateHistory>,
    ) -> Result<(), PortError>;

    /// Removes a currency together with its history
    async fn delete_currency(&self, id: CurrencyId) -> Result<(), PortError>;

    /// Clears `is_base` on every currency except `keep`
    async fn clear_base_flag(&self, keep: CurrencyId) -> Result<(), PortError>;

    /// History of one currency, newest first
    async fn rate_history(&self, id: CurrencyId) -> Result<Vec<ExchangeRateHistory>, PortError>;

    /// Every history row of every currency
    async fn all_rate_history(&self) -> Result<Vec<ExchangeRateHistory>, PortError>;
}

/// Extension trait for CurrencyPort with convenience methods
#[async_trait]
pub trait CurrencyPortExt: CurrencyPort {
    /// The designated base currency, if any
    async fn base_currency(&self) -> Result<Option<Currency>, PortError> {
        let currencies = self.list_currencies().await?;
        Ok(currencies.into_iter().find(|c| c.is_base))
    }

    /// Loads a consistent snapshot for conversion
    async fn load_rate_book(&self) -> Result<RateBook, PortError> {
        let currencies = self.list_currencies().await?;
        let history = self.all_rate_history().await?;
        Ok(RateBook::new(currencies, history))
    }
}

// Blanket implementation for all CurrencyPort implementors
impl<T: CurrencyPort + ?Sized> CurrencyPortExt for T {}

/// Port telling whether recorded amounts are still denominated in a currency
///
/// Implemented by whatever stores the amounts; a currency in use cannot be
/// deleted.
#[async_trait]
pub trait CurrencyUsagePort: DomainPort {
    async fn is_currency_in_use(&self, code: &CurrencyCode) -> Result<bool, PortError>;
}

/// In-memory implementation of CurrencyPort
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default)]
    struct State {
        currencies: HashMap<CurrencyId, Currency>,
        history: Vec<ExchangeRateHistory>,
    }

    /// Currency store kept in memory
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryCurrencyStore {
        state: Arc<RwLock<State>>,
    }

    impl InMemoryCurrencyStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with currencies for testing
        pub async fn with_currencies(currencies: Vec<Currency>) -> Self {
            let store = Self::new();
            {
                let mut state = store.state.write().await;
                for currency in currencies {
                    state.currencies.insert(currency.id, currency);
                }
            }
            store
        }

        /// Appends history rows directly, bypassing the update path
        pub async fn seed_history(&self, rows: Vec<ExchangeRateHistory>) {
            self.state.write().await.history.extend(rows);
        }
    }

    impl DomainPort for InMemoryCurrencyStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryCurrencyStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-currency-store", 0)
        }
    }

    /// Usage answered from an explicit set of codes
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryCurrencyUsage {
        codes: Arc<RwLock<HashSet<CurrencyCode>>>,
    }

    impl InMemoryCurrencyUsage {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn mark_in_use(&self, code: CurrencyCode) {
            self.codes.write().await.insert(code);
        }
    }

    impl DomainPort for InMemoryCurrencyUsage {}

    #[async_trait]
    impl CurrencyUsagePort for InMemoryCurrencyUsage {
        async fn is_currency_in_use(&self, code: &CurrencyCode) -> Result<bool, PortError> {
            Ok(self.codes.read().await.contains(code))
        }
    }

    #[async_trait]
    impl CurrencyPort for InMemoryCurrencyStore {
        async fn list_currencies(&self) -> Result<Vec<Currency>, PortError> {
            let state = self.state.read().await;
            let mut currencies: Vec<_> = state.currencies.values().cloned().collect();
            currencies.sort_by(|a, b| a.code.cmp(&b.code));
            Ok(currencies)
        }

        async fn get_currency(&self, id: CurrencyId) -> Result<Currency, PortError> {
            self.state
                .read()
                .await
                .currencies
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Currency", id))
        }

        async fn find_by_code(&self, code: &CurrencyCode) -> Result<Option<Currency>, PortError> {
            let state = self.state.read().await;
            Ok(state.currencies.values().find(|c| &c.code == code).cloned())
        }

        async fn insert_currency(&self, currency: &Currency) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.currencies.values().any(|c| c.code == currency.code) {
                return Err(PortError::conflict(format!(
                    "currency code {} already exists",
                    currency.code
                )));
            }
            state.currencies.insert(currency.id, currency.clone());
            Ok(())
        }

        async fn update_currency(
            &self,
            currency: &Currency,
            history: Option<&ExchangeRateHistory>,
        ) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.currencies.contains_key(&currency.id) {
                return Err(PortError::not_found("Currency", currency.id));
            }
            if state
                .currencies
                .values()
                .any(|c| c.id != currency.id && c.code == currency.code)
            {
                return Err(PortError::conflict(format!(
                    "currency code {} already exists",
                    currency.code
                )));
            }
            if let Some(row) = history {
                state.history.push(row.clone());
            }
            state.currencies.insert(currency.id, currency.clone());
            Ok(())
        }

        async fn delete_currency(&self, id: CurrencyId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.currencies.remove(&id).is_none() {
                return Err(PortError::not_found("Currency", id));
            }
            state.history.retain(|row| row.currency_id != id);
            Ok(())
        }

        async fn clear_base_flag(&self, keep: CurrencyId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            for currency in state.currencies.values_mut() {
                if currency.id != keep {
                    currency.is_base = false;
                }
            }
            Ok(())
        }

        async fn rate_history(&self, id: CurrencyId) -> Result<Vec<ExchangeRateHistory>, PortError> {
            let state = self.state.read().await;
            let mut rows: Vec<_> = state
                .history
                .iter()
                .filter(|row| row.currency_id == id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.effective_date
                    .cmp(&a.effective_date)
                    .then(b.recorded_at.cmp(&a.recorded_at))
            });
            Ok(rows)
        }

        async fn all_rate_history(&self) -> Result<Vec<ExchangeRateHistory>, PortError> {
            Ok(self.state.read().await.history.clone())
        }
    }
}
