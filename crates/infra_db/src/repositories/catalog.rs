//! Reference lists, buyers and dashboard settings

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BuyerId, CurrencyId, ReferenceId};
use domain_vehicle::{Buyer, DashboardSettings, ReferenceItem, ReferenceKind};

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReferenceRow {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReferenceRow> for ReferenceItem {
    type Error = DatabaseError;

    fn try_from(row: ReferenceRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<ReferenceKind>()
            .map_err(|e| DatabaseError::corrupt(format!("reference {}: {e}", row.id)))?;
        Ok(ReferenceItem {
            id: ReferenceId::from_uuid(row.id),
            kind,
            name: row.name,
            parent_id: row.parent_id.map(ReferenceId::from_uuid),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BuyerRow {
    pub id: Uuid,
    pub name: String,
    pub contact_info: String,
    pub address: String,
    pub national_id: String,
    pub additional_info: String,
    pub created_at: DateTime<Utc>,
}

impl From<BuyerRow> for Buyer {
    fn from(row: BuyerRow) -> Self {
        Buyer {
            id: BuyerId::from_uuid(row.id),
            name: row.name,
            contact_info: row.contact_info,
            address: row.address,
            national_id: row.national_id,
            additional_info: row.additional_info,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettingsRow {
    pub site_name: String,
    pub logo_path: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub base_currency_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for DashboardSettings {
    fn from(row: SettingsRow) -> Self {
        DashboardSettings {
            site_name: row.site_name,
            logo_path: row.logo_path,
            address: row.address,
            email: row.email,
            phone_number: row.phone_number,
            base_currency_id: row.base_currency_id.map(CurrencyId::from_uuid),
            updated_at: row.updated_at,
        }
    }
}

const BUYER_COLUMNS: &str =
    "id, name, contact_info, address, national_id, additional_info, created_at";

/// Escapes LIKE wildcards so a search fragment matches literally
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Repository for the lookup tables around a vehicle
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // References
    // ========================================================================

    pub async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, DatabaseError> {
        let rows: Vec<ReferenceRow> = sqlx::query_as(
            r#"
            SELECT id, kind, name, parent_id, created_at
            FROM reference_items
            WHERE kind = $1
            ORDER BY name
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ReferenceItem::try_from).collect()
    }

    pub async fn get_reference(&self, id: ReferenceId) -> Result<ReferenceItem, DatabaseError> {
        let row: Option<ReferenceRow> = sqlx::query_as(
            "SELECT id, kind, name, parent_id, created_at FROM reference_items WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::not_found("ReferenceItem", id))?
            .try_into()
    }

    pub async fn save_reference(&self, item: &ReferenceItem) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO reference_items (id, kind, name, parent_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                parent_id = EXCLUDED.parent_id
            "#,
        )
        .bind(Uuid::from(item.id))
        .bind(item.kind.as_str())
        .bind(&item.name)
        .bind(item.parent_id.map(Uuid::from))
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Child car types cascade and vehicle references are set to null
    pub async fn delete_reference(&self, id: ReferenceId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM reference_items WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("ReferenceItem", id));
        }
        Ok(())
    }

    // ========================================================================
    // Buyers
    // ========================================================================

    pub async fn list_buyers(&self, name_filter: Option<&str>) -> Result<Vec<Buyer>, DatabaseError> {
        let rows: Vec<BuyerRow> = match name_filter {
            Some(fragment) => {
                sqlx::query_as(&format!(
                    "SELECT {BUYER_COLUMNS} FROM buyers WHERE name ILIKE $1 ORDER BY name"
                ))
                .bind(like_pattern(fragment))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {BUYER_COLUMNS} FROM buyers ORDER BY name"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, DatabaseError> {
        let row: Option<BuyerRow> =
            sqlx::query_as(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await?;
        row.map(Into::into)
            .ok_or_else(|| DatabaseError::not_found("Buyer", id))
    }

    pub async fn save_buyer(&self, buyer: &Buyer) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO buyers (id, name, contact_info, address, national_id, additional_info, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                contact_info = EXCLUDED.contact_info,
                address = EXCLUDED.address,
                national_id = EXCLUDED.national_id,
                additional_info = EXCLUDED.additional_info
            "#,
        )
        .bind(Uuid::from(buyer.id))
        .bind(&buyer.name)
        .bind(&buyer.contact_info)
        .bind(&buyer.address)
        .bind(&buyer.national_id)
        .bind(&buyer.additional_info)
        .bind(buyer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Sales that referenced the buyer keep their row with a null buyer
    pub async fn delete_buyer(&self, id: BuyerId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM buyers WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Buyer", id));
        }
        Ok(())
    }

    // ========================================================================
    // Dashboard settings
    // ========================================================================

    /// Returns the settings row, inserting the defaults on first use
    pub async fn load_or_create_settings(&self) -> Result<DashboardSettings, DatabaseError> {
        let defaults = DashboardSettings::default();
        sqlx::query(
            r#"
            INSERT INTO dashboard_settings (id, site_name, updated_at)
            VALUES (1, $1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&defaults.site_name)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await?;

        let row: SettingsRow = sqlx::query_as(
            r#"
            SELECT site_name, logo_path, address, email, phone_number, base_currency_id, updated_at
            FROM dashboard_settings
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    pub async fn save_settings(&self, settings: &DashboardSettings) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO dashboard_settings
                (id, site_name, logo_path, address, email, phone_number, base_currency_id, updated_at)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                site_name = EXCLUDED.site_name,
                logo_path = EXCLUDED.logo_path,
                address = EXCLUDED.address,
                email = EXCLUDED.email,
                phone_number = EXCLUDED.phone_number,
                base_currency_id = EXCLUDED.base_currency_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&settings.site_name)
        .bind(&settings.logo_path)
        .bind(&settings.address)
        .bind(&settings.email)
        .bind(&settings.phone_number)
        .bind(settings.base_currency_id.map(Uuid::from))
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_like_pattern_has_no_bare_wildcards(fragment in "[a-z%_\\\\ ]{0,12}") {
            let pattern = like_pattern(&fragment);
            let inner = &pattern[1..pattern.len() - 1];
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    prop_assert!(chars.next().is_some());
                } else {
                    prop_assert!(c != '%' && c != '_');
                }
            }
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" ali "), "%ali%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_reference_row_with_unknown_kind_is_corrupt() {
        let row = ReferenceRow {
            id: Uuid::new_v4(),
            kind: "engine".to_string(),
            name: "V8".to_string(),
            parent_id: None,
            created_at: Utc::now(),
        };
        let err = ReferenceItem::try_from(row).unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptRow(_)));
    }

    #[test]
    fn test_settings_row_maps_currency() {
        let currency = Uuid::new_v4();
        let row = SettingsRow {
            site_name: "Herat Motors".to_string(),
            logo_path: None,
            address: None,
            email: Some("desk@example.com".to_string()),
            phone_number: None,
            base_currency_id: Some(currency),
            updated_at: Utc::now(),
        };
        let settings = DashboardSettings::from(row);
        assert_eq!(settings.base_currency_id, Some(CurrencyId::from_uuid(currency)));
        assert_eq!(settings.email.as_deref(), Some("desk@example.com"));
    }
}
