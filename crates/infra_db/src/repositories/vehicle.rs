//! Vehicle and image repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ImageId, ReferenceId, VehicleId};
use domain_vehicle::{Vehicle, VehicleImage};

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleRow {
    pub id: Uuid,
    pub lot_number: String,
    pub vin: String,
    pub position: String,
    pub related_id: Option<Uuid>,
    pub mark_id: Option<Uuid>,
    pub car_type_id: Option<Uuid>,
    pub model_year_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub action_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: VehicleId::from_uuid(row.id),
            lot_number: row.lot_number,
            vin: row.vin,
            position: row.position,
            related_id: row.related_id.map(ReferenceId::from_uuid),
            mark_id: row.mark_id.map(ReferenceId::from_uuid),
            car_type_id: row.car_type_id.map(ReferenceId::from_uuid),
            model_year_id: row.model_year_id.map(ReferenceId::from_uuid),
            color_id: row.color_id.map(ReferenceId::from_uuid),
            action_id: row.action_id.map(ReferenceId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImageRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub path: String,
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ImageRow> for VehicleImage {
    fn from(row: ImageRow) -> Self {
        VehicleImage {
            id: ImageId::from_uuid(row.id),
            vehicle_id: VehicleId::from_uuid(row.vehicle_id),
            path: row.path,
            description: row.description,
            uploaded_at: row.uploaded_at,
        }
    }
}

const VEHICLE_COLUMNS: &str = "id, lot_number, vin, position, related_id, mark_id, car_type_id, \
     model_year_id, color_id, action_id, created_at, updated_at";

fn uuid_of(id: Option<ReferenceId>) -> Option<Uuid> {
    id.map(Uuid::from)
}

/// Repository for vehicle records and their images
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Vehicles, newest first
    pub async fn list(&self) -> Result<Vec<Vehicle>, DatabaseError> {
        let rows: Vec<VehicleRow> = sqlx::query_as(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: VehicleId) -> Result<Vehicle, DatabaseError> {
        let row: Option<VehicleRow> =
            sqlx::query_as(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await?;
        row.map(Into::into)
            .ok_or_else(|| DatabaseError::not_found("Vehicle", id))
    }

    pub async fn find_by_lot(&self, lot_number: &str) -> Result<Option<Vehicle>, DatabaseError> {
        let row: Option<VehicleRow> =
            sqlx::query_as(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE lot_number = $1"))
                .bind(lot_number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// Inserts or updates; the lot number of an existing row is never changed
    pub async fn save(&self, vehicle: &Vehicle) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, lot_number, vin, position, related_id, mark_id, car_type_id,
                                  model_year_id, color_id, action_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                vin = EXCLUDED.vin,
                position = EXCLUDED.position,
                related_id = EXCLUDED.related_id,
                mark_id = EXCLUDED.mark_id,
                car_type_id = EXCLUDED.car_type_id,
                model_year_id = EXCLUDED.model_year_id,
                color_id = EXCLUDED.color_id,
                action_id = EXCLUDED.action_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Uuid::from(vehicle.id))
        .bind(&vehicle.lot_number)
        .bind(&vehicle.vin)
        .bind(&vehicle.position)
        .bind(uuid_of(vehicle.related_id))
        .bind(uuid_of(vehicle.mark_id))
        .bind(uuid_of(vehicle.car_type_id))
        .bind(uuid_of(vehicle.model_year_id))
        .bind(uuid_of(vehicle.color_id))
        .bind(uuid_of(vehicle.action_id))
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes the vehicle; stage, sale and image rows cascade
    pub async fn delete(&self, id: VehicleId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Vehicle", id));
        }
        Ok(())
    }

    /// Images of a vehicle, oldest first
    pub async fn images_for(&self, vehicle_id: VehicleId) -> Result<Vec<VehicleImage>, DatabaseError> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            r#"
            SELECT id, vehicle_id, path, description, uploaded_at
            FROM vehicle_images
            WHERE vehicle_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(Uuid::from(vehicle_id))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_image(&self, id: ImageId) -> Result<VehicleImage, DatabaseError> {
        let row: Option<ImageRow> = sqlx::query_as(
            "SELECT id, vehicle_id, path, description, uploaded_at FROM vehicle_images WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into)
            .ok_or_else(|| DatabaseError::not_found("Image", id))
    }

    pub async fn insert_image(&self, image: &VehicleImage) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO vehicle_images (id, vehicle_id, path, description, uploaded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(image.id))
        .bind(Uuid::from(image.vehicle_id))
        .bind(&image.path)
        .bind(&image.description)
        .bind(image.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_image(&self, id: ImageId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM vehicle_images WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Image", id));
        }
        Ok(())
    }
}
