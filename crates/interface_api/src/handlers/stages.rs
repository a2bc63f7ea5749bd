//! Stage handlers
//!
//! Every stage is a single record per vehicle. `PUT` creates it on first use
//! and overwrites the submitted fields afterwards.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::VehicleId;
use domain_vehicle::{
    KabulExpenses, KabulExpensesInput, Purchase, PurchaseInput, RepairExpenses,
    RepairExpensesInput, SaleInfo, SaleInput, Shipping, ShippingInput, WorldExpenses,
    WorldExpensesInput,
};

use crate::{error::ApiError, AppState};

fn recorded<T>(stage: Option<T>, name: &str, id: VehicleId) -> Result<Json<T>, ApiError> {
    stage
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no {name} recorded for vehicle {id}")))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Purchase>, ApiError> {
    let id = VehicleId::from_uuid(id);
    recorded(state.ledger.purchase(id).await?, "purchase", id)
}

/// Saves the purchase and recomputes the unpaid balance
pub async fn save_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PurchaseInput>,
) -> Result<Json<Purchase>, ApiError> {
    let purchase = state
        .ledger
        .save_purchase(VehicleId::from_uuid(id), input)
        .await?;
    Ok(Json(purchase))
}

pub async fn get_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipping>, ApiError> {
    let id = VehicleId::from_uuid(id);
    recorded(state.ledger.shipping(id).await?, "shipping", id)
}

pub async fn save_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ShippingInput>,
) -> Result<Json<Shipping>, ApiError> {
    let shipping = state
        .ledger
        .save_shipping(VehicleId::from_uuid(id), input)
        .await?;
    Ok(Json(shipping))
}

pub async fn get_world_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorldExpenses>, ApiError> {
    let id = VehicleId::from_uuid(id);
    recorded(state.ledger.world_expenses(id).await?, "world expenses", id)
}

/// Saves the Dubai-to-Herat expenses and recomputes the shipping balance
pub async fn save_world_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<WorldExpensesInput>,
) -> Result<Json<WorldExpenses>, ApiError> {
    let world = state
        .ledger
        .save_world_expenses(VehicleId::from_uuid(id), input)
        .await?;
    Ok(Json(world))
}

pub async fn get_kabul_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<KabulExpenses>, ApiError> {
    let id = VehicleId::from_uuid(id);
    recorded(state.ledger.kabul_expenses(id).await?, "kabul expenses", id)
}

pub async fn save_kabul_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<KabulExpensesInput>,
) -> Result<Json<KabulExpenses>, ApiError> {
    let kabul = state
        .ledger
        .save_kabul_expenses(VehicleId::from_uuid(id), input)
        .await?;
    Ok(Json(kabul))
}

pub async fn get_repair_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RepairExpenses>, ApiError> {
    let id = VehicleId::from_uuid(id);
    recorded(state.ledger.repair_expenses(id).await?, "repair expenses", id)
}

pub async fn save_repair_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RepairExpensesInput>,
) -> Result<Json<RepairExpenses>, ApiError> {
    let repair = state
        .ledger
        .save_repair_expenses(VehicleId::from_uuid(id), input)
        .await?;
    Ok(Json(repair))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleInfo>, ApiError> {
    let id = VehicleId::from_uuid(id);
    recorded(state.ledger.sale(id).await?, "sale", id)
}

/// Saves the sale; an unsold vehicle is priced at its final cost
pub async fn save_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SaleInput>,
) -> Result<Json<SaleInfo>, ApiError> {
    let sale = state.ledger.save_sale(VehicleId::from_uuid(id), input).await?;
    Ok(Json(sale))
}
