//! Buyer and reference catalog handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BuyerId, ReferenceId};
use domain_vehicle::{Buyer, ReferenceItem, ReferenceKind};

use crate::dto::catalog::*;
use crate::{error::ApiError, AppState};

// ============================================================================
// Buyers
// ============================================================================

/// Lists buyers, optionally filtered by a case-insensitive name fragment
pub async fn list_buyers(
    State(state): State<AppState>,
    Query(query): Query<BuyerQuery>,
) -> Result<Json<Vec<Buyer>>, ApiError> {
    Ok(Json(state.ledger.list_buyers(query.name.as_deref()).await?))
}

pub async fn create_buyer(
    State(state): State<AppState>,
    Json(request): Json<BuyerRequest>,
) -> Result<(StatusCode, Json<Buyer>), ApiError> {
    request.validate()?;
    let buyer = state.ledger.create_buyer(request.into()).await?;
    Ok((StatusCode::CREATED, Json(buyer)))
}

pub async fn get_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Buyer>, ApiError> {
    Ok(Json(state.ledger.get_buyer(BuyerId::from_uuid(id)).await?))
}

pub async fn update_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BuyerRequest>,
) -> Result<Json<Buyer>, ApiError> {
    request.validate()?;
    let buyer = state
        .ledger
        .update_buyer(BuyerId::from_uuid(id), request.into())
        .await?;
    Ok(Json(buyer))
}

pub async fn delete_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.ledger.delete_buyer(BuyerId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reference lists
// ============================================================================

/// Loads an item and checks it belongs to the list named in the path
async fn item_of_kind(
    state: &AppState,
    kind: ReferenceKind,
    id: Uuid,
) -> Result<ReferenceItem, ApiError> {
    let item = state.ledger.get_reference(ReferenceId::from_uuid(id)).await?;
    if item.kind != kind {
        return Err(ApiError::NotFound(format!("{} {id}", kind.as_str())));
    }
    Ok(item)
}

pub async fn list_references(
    State(state): State<AppState>,
    Path(kind): Path<ReferenceKind>,
) -> Result<Json<Vec<ReferenceItem>>, ApiError> {
    Ok(Json(state.ledger.list_references(kind).await?))
}

/// Adds an item; car types name their mark in `parent_id`
pub async fn create_reference(
    State(state): State<AppState>,
    Path(kind): Path<ReferenceKind>,
    Json(request): Json<ReferenceRequest>,
) -> Result<(StatusCode, Json<ReferenceItem>), ApiError> {
    request.validate()?;
    let item = state.ledger.create_reference(kind, request.into()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_reference(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReferenceKind, Uuid)>,
) -> Result<Json<ReferenceItem>, ApiError> {
    Ok(Json(item_of_kind(&state, kind, id).await?))
}

pub async fn update_reference(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReferenceKind, Uuid)>,
    Json(request): Json<ReferenceRequest>,
) -> Result<Json<ReferenceItem>, ApiError> {
    request.validate()?;
    let item = item_of_kind(&state, kind, id).await?;
    let updated = state.ledger.update_reference(item.id, request.into()).await?;
    Ok(Json(updated))
}

/// Deletes an item; deleting a mark removes its car types
pub async fn delete_reference(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ReferenceKind, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let item = item_of_kind(&state, kind, id).await?;
    state.ledger.delete_reference(item.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
