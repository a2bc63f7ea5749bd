//! Currency handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{CurrencyCode, CurrencyId};
use domain_currency::{Currency, CurrencyConverter, ExchangeRateHistory};

use crate::dto::currency::*;
use crate::{error::ApiError, AppState};

/// Lists every currency
pub async fn list_currencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<Currency>>, ApiError> {
    Ok(Json(state.currencies.list().await?))
}

/// Creates a currency; marking it base demotes the previous base
pub async fn create_currency(
    State(state): State<AppState>,
    Json(request): Json<CreateCurrencyRequest>,
) -> Result<(StatusCode, Json<Currency>), ApiError> {
    request.validate()?;
    let currency = state.currencies.create(request.into_new_currency()?).await?;
    Ok((StatusCode::CREATED, Json(currency)))
}

/// The current base currency
pub async fn base_currency(State(state): State<AppState>) -> Result<Json<Currency>, ApiError> {
    state
        .currencies
        .base_currency()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no base currency configured".to_string()))
}

/// Converts an amount into base units at the rate effective on `date`
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let code = query
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(CurrencyCode::parse)
        .transpose()
        .map_err(|e| ApiError::validation("currency", e.to_string()))?;

    let book = state.currencies.rate_book().await?;
    let converter = CurrencyConverter::new(&book);
    let amount_in_base = converter.convert_to_base(Some(query.amount), code.as_ref(), query.date);

    Ok(Json(ConvertResponse {
        amount: query.amount,
        currency: code.map(String::from),
        date: query.date,
        base_currency: converter.base_code().map(|c| c.as_str().to_string()),
        amount_in_base,
    }))
}

pub async fn get_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Currency>, ApiError> {
    Ok(Json(state.currencies.get(CurrencyId::from_uuid(id)).await?))
}

/// Updates a currency; a changed rate is recorded in its history
pub async fn update_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCurrencyRequest>,
) -> Result<Json<Currency>, ApiError> {
    request.validate()?;
    let currency = state
        .currencies
        .update(CurrencyId::from_uuid(id), request.into_update()?)
        .await?;
    Ok(Json(currency))
}

pub async fn delete_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.currencies.delete(CurrencyId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rate history of one currency, newest first
pub async fn rate_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ExchangeRateHistory>>, ApiError> {
    Ok(Json(state.currencies.rate_history(CurrencyId::from_uuid(id)).await?))
}
