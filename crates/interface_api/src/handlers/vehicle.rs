//! Vehicle handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::VehicleId;
use domain_vehicle::{CostReport, Vehicle};

use crate::dto::vehicle::*;
use crate::{error::ApiError, AppState};

/// Lists vehicles, newest first
pub async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(state.ledger.list_vehicles().await?))
}

/// Registers a vehicle under a freshly allocated lot number
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<VehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    request.validate()?;
    let vehicle = state.ledger.create_vehicle(request.into()).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn find_by_lot(
    State(state): State<AppState>,
    Path(lot_number): Path<String>,
) -> Result<Json<Vehicle>, ApiError> {
    Ok(Json(state.ledger.find_by_lot(&lot_number).await?))
}

/// A vehicle with every stage, its derived figures and its images
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleDetailResponse>, ApiError> {
    let id = VehicleId::from_uuid(id);
    let dossier = state.ledger.dossier(id).await?;
    let report = state.ledger.cost_report(id).await?;
    let images = state.ledger.list_images(id).await?;
    Ok(Json(VehicleDetailResponse {
        dossier,
        report,
        images,
    }))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VehicleRequest>,
) -> Result<Json<Vehicle>, ApiError> {
    request.validate()?;
    let vehicle = state
        .ledger
        .update_vehicle(VehicleId::from_uuid(id), request.into())
        .await?;
    Ok(Json(vehicle))
}

/// Deletes a vehicle together with its stages, sale and images
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.ledger.delete_vehicle(VehicleId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cost_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CostReport>, ApiError> {
    Ok(Json(state.ledger.cost_report(VehicleId::from_uuid(id)).await?))
}
