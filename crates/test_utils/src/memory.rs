//! In-memory ledger harness
//!
//! Wires [`VehicleLedger`] and [`CurrencyService`] to the in-memory adapters so
//! service and HTTP tests run without PostgreSQL. The handles to the stores
//! stay available for assertions on what was written.

use std::sync::Arc;

use domain_currency::{Currency, CurrencyService, ExchangeRateHistory, InMemoryCurrencyStore};
use domain_vehicle::{InMemoryImageStorage, InMemoryVehicleStore, LedgerPorts, VehicleLedger};

use crate::fixtures::CurrencyFixtures;

/// A ledger backed entirely by memory
#[derive(Clone)]
pub struct MemoryLedger {
    pub ledger: VehicleLedger,
    pub currencies: CurrencyService,
    pub currency_store: InMemoryCurrencyStore,
    pub store: InMemoryVehicleStore,
    pub images: InMemoryImageStorage,
}

impl MemoryLedger {
    /// USD as base with AED at 0.28, and AED at 0.27 from 2024-01-01
    pub async fn standard() -> Self {
        let aed = CurrencyFixtures::aed();
        let history = vec![CurrencyFixtures::aed_history(&aed)];
        Self::with_currencies(vec![CurrencyFixtures::usd(), aed], history).await
    }

    /// No currencies at all; conversion passes amounts through
    pub async fn empty() -> Self {
        Self::with_currencies(Vec::new(), Vec::new()).await
    }

    pub async fn with_currencies(currencies: Vec<Currency>, history: Vec<ExchangeRateHistory>) -> Self {
        let currency_store = InMemoryCurrencyStore::with_currencies(currencies).await;
        currency_store.seed_history(history).await;

        let store = InMemoryVehicleStore::new();
        let images = InMemoryImageStorage::new();
        let ledger = VehicleLedger::new(LedgerPorts {
            vehicles: Arc::new(store.clone()),
            buyers: Arc::new(store.clone()),
            references: Arc::new(store.clone()),
            settings: Arc::new(store.clone()),
            currencies: Arc::new(currency_store.clone()),
            images: Arc::new(images.clone()),
        });

        Self {
            ledger,
            currencies: CurrencyService::new(
                Arc::new(currency_store.clone()),
                Arc::new(store.clone()),
            ),
            currency_store,
            store,
            images,
        }
    }
}
