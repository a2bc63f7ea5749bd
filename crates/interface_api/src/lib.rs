//! HTTP API Layer
//!
//! REST surface of the vehicle ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers per resource
//! - **DTOs**: Request bodies with request-level validation
//! - **Error Handling**: Consistent JSON error responses with per-field details
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(ledger, currencies, settings, health, config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_currency::CurrencyService;
use domain_vehicle::{DashboardSettings, VehicleLedger};

use crate::config::ApiConfig;
use crate::handlers::{catalog, currency, dashboard, health, images, stages, vehicle};

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: VehicleLedger,
    pub currencies: CurrencyService,
    /// Display settings loaded at startup, replaced on every update
    pub settings: Arc<RwLock<DashboardSettings>>,
    /// Adapters probed by the readiness check
    pub health: Vec<Arc<dyn HealthCheckable>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        ledger: VehicleLedger,
        currencies: CurrencyService,
        settings: DashboardSettings,
        health: Vec<Arc<dyn HealthCheckable>>,
        config: ApiConfig,
    ) -> Self {
        Self {
            ledger,
            currencies,
            settings: Arc::new(RwLock::new(settings)),
            health,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let currency_routes = Router::new()
        .route("/", get(currency::list_currencies).post(currency::create_currency))
        .route("/base", get(currency::base_currency))
        .route("/convert", get(currency::convert))
        .route(
            "/:id",
            get(currency::get_currency)
                .put(currency::update_currency)
                .delete(currency::delete_currency),
        )
        .route("/:id/history", get(currency::rate_history));

    let vehicle_routes = Router::new()
        .route("/", get(vehicle::list_vehicles).post(vehicle::create_vehicle))
        .route("/lot/:lot_number", get(vehicle::find_by_lot))
        .route(
            "/:id",
            get(vehicle::get_vehicle)
                .put(vehicle::update_vehicle)
                .delete(vehicle::delete_vehicle),
        )
        .route("/:id/report", get(vehicle::cost_report))
        .route("/:id/purchase", get(stages::get_purchase).put(stages::save_purchase))
        .route("/:id/shipping", get(stages::get_shipping).put(stages::save_shipping))
        .route(
            "/:id/world-expenses",
            get(stages::get_world_expenses).put(stages::save_world_expenses),
        )
        .route(
            "/:id/kabul-expenses",
            get(stages::get_kabul_expenses).put(stages::save_kabul_expenses),
        )
        .route(
            "/:id/repair-expenses",
            get(stages::get_repair_expenses).put(stages::save_repair_expenses),
        )
        .route("/:id/sale", get(stages::get_sale).put(stages::save_sale))
        .route(
            "/:id/images",
            get(images::list_images)
                .post(images::upload_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    let buyer_routes = Router::new()
        .route("/", get(catalog::list_buyers).post(catalog::create_buyer))
        .route(
            "/:id",
            get(catalog::get_buyer)
                .put(catalog::update_buyer)
                .delete(catalog::delete_buyer),
        );

    let reference_routes = Router::new()
        .route("/:kind", get(catalog::list_references).post(catalog::create_reference))
        .route(
            "/:kind/:id",
            get(catalog::get_reference)
                .put(catalog::update_reference)
                .delete(catalog::delete_reference),
        );

    let api_routes = Router::new()
        .nest("/currencies", currency_routes)
        .nest("/vehicles", vehicle_routes)
        .route("/images/:id", delete(images::delete_image))
        .nest("/buyers", buyer_routes)
        .nest("/references", reference_routes)
        .route("/dashboard", get(dashboard::dashboard))
        .route("/settings", get(dashboard::get_settings).put(dashboard::update_settings))
        .route("/settings/reload", post(dashboard::reload_settings));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
