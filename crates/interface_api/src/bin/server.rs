//! Vehicle Ledger - API Server Binary
//!
//! Starts the HTTP API over the PostgreSQL-backed ledger.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin vehicle-ledger-api
//!
//! # Run with environment variables
//! APP_PORT=9000 DATABASE_URL=postgres://... cargo run --bin vehicle-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `APP_HOST` - Server host (default: 0.0.0.0)
//! * `APP_PORT` - Server port (default: 8080)
//! * `APP_DATABASE_URL` or `DATABASE_URL` - PostgreSQL connection string
//! * `APP_LOG_LEVEL` - Log level or filter directive (default: info); `RUST_LOG` wins when set
//! * `APP_MEDIA_ROOT` - Directory for uploaded images (default: media)
//! * `APP_MAX_CONNECTIONS` - Database pool size (default: 10)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::HealthCheckable;
use domain_currency::CurrencyService;
use domain_vehicle::{FsImageStorage, LedgerPorts, VehicleLedger};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresCurrencyAdapter, PostgresLedgerAdapter};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.log_level);

    info!(
        host = %config.host,
        port = %config.port,
        media_root = %config.media_root,
        "Starting Vehicle Ledger API Server"
    );

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).max_connections(config.max_connections),
    )
    .await
    .context("database connection failed")?;
    run_migrations(&pool).await.context("migrations failed")?;

    let currency_adapter = Arc::new(PostgresCurrencyAdapter::new(pool.clone()));
    let ledger_adapter = Arc::new(PostgresLedgerAdapter::new(pool.clone()));

    let currencies = CurrencyService::new(currency_adapter.clone(), ledger_adapter.clone());
    let base = currencies
        .ensure_base_currency()
        .await
        .context("seeding the base currency failed")?;
    info!(base_currency = %base.code, "base currency ready");

    let ledger = VehicleLedger::new(LedgerPorts {
        vehicles: ledger_adapter.clone(),
        buyers: ledger_adapter.clone(),
        references: ledger_adapter.clone(),
        settings: ledger_adapter.clone(),
        currencies: currency_adapter.clone(),
        images: Arc::new(FsImageStorage::new(&config.media_root)),
    });
    let settings = ledger.settings().await.context("loading settings failed")?;

    let health: Vec<Arc<dyn HealthCheckable>> = vec![
        currency_adapter as Arc<dyn HealthCheckable>,
        ledger_adapter as Arc<dyn HealthCheckable>,
    ];
    let state = AppState::new(ledger, currencies, settings, health, config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;
    info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
