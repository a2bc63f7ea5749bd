//! Vehicle image handlers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::{ImageId, VehicleId};
use domain_vehicle::VehicleImage;

use crate::{error::ApiError, AppState};

pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VehicleImage>>, ApiError> {
    Ok(Json(state.ledger.list_images(VehicleId::from_uuid(id)).await?))
}

/// Accepts a multipart form with a `file` part and an optional `description`
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<VehicleImage>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut description = String::new();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("description") => description = field.text().await?,
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::validation("file", "is required"))?;
    let image = state
        .ledger
        .attach_image(VehicleId::from_uuid(id), &file_name, &bytes, description)
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// Deletes the image record and its stored file
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.ledger.delete_image(ImageId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
