//! Dashboard and display settings handlers

use axum::{extract::State, Json};
use tracing::info;
use validator::Validate;

use domain_vehicle::{DashboardSettings, DashboardSummary};

use crate::dto::catalog::SettingsRequest;
use crate::{error::ApiError, AppState};

/// Totals across every vehicle at the current rates
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.ledger.dashboard().await?))
}

/// The settings loaded at startup or by the last update
pub async fn get_settings(State(state): State<AppState>) -> Json<DashboardSettings> {
    Json(state.settings.read().await.clone())
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<SettingsRequest>,
) -> Result<Json<DashboardSettings>, ApiError> {
    request.validate()?;
    let settings = state.ledger.update_settings(request.into()).await?;
    *state.settings.write().await = settings.clone();
    Ok(Json(settings))
}

/// Re-reads the stored settings into the shared copy
pub async fn reload_settings(
    State(state): State<AppState>,
) -> Result<Json<DashboardSettings>, ApiError> {
    let settings = state.ledger.settings().await?;
    *state.settings.write().await = settings.clone();
    info!(site_name = %settings.site_name, "settings reloaded");
    Ok(Json(settings))
}
