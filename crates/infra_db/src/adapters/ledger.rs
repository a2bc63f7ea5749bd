//! PostgreSQL ledger adapter
//!
//! One adapter serves the vehicle, buyer, reference and settings ports so the
//! whole ledger shares a single pool. It also answers currency usage, since
//! the amounts live in its stage tables.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    BuyerId, CurrencyCode, DomainPort, HealthCheckResult, HealthCheckable, ImageId,
    KabulExpensesId, PortError, PurchaseId, ReferenceId, RepairExpensesId, SaleId, ShippingId,
    VehicleId, WorldExpensesId,
};
use domain_currency::CurrencyUsagePort;
use domain_vehicle::{
    Buyer, BuyerPort, DashboardSettings, KabulExpenses, Purchase, ReferenceItem, ReferenceKind,
    ReferencePort, RepairExpenses, SaleInfo, SettingsPort, Shipping, Vehicle, VehicleImage,
    VehiclePort, WorldExpenses,
};

use crate::error::DatabaseError;
use crate::repositories::{CatalogRepository, StageRepository, VehicleRepository};

/// A foreign key on `vehicle_id` failing means the vehicle is gone
fn for_vehicle(error: DatabaseError, vehicle_id: VehicleId) -> PortError {
    match error {
        DatabaseError::ForeignKeyViolation(ref message) if message.contains("vehicle_id") => {
            PortError::not_found("Vehicle", vehicle_id)
        }
        other => other.into(),
    }
}

#[derive(Debug, Clone)]
pub struct PostgresLedgerAdapter {
    vehicles: VehicleRepository,
    stages: StageRepository,
    catalog: CatalogRepository,
    pool: PgPool,
}

impl PostgresLedgerAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            stages: StageRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresLedgerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLedgerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-ledger-adapter").await
    }
}

#[async_trait]
impl VehiclePort for PostgresLedgerAdapter {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, PortError> {
        Ok(self.vehicles.list().await?)
    }

    async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle, PortError> {
        Ok(self.vehicles.get(id).await?)
    }

    async fn find_by_lot(&self, lot_number: &str) -> Result<Option<Vehicle>, PortError> {
        Ok(self.vehicles.find_by_lot(lot_number).await?)
    }

    #[instrument(skip(self, vehicle), fields(lot_number = %vehicle.lot_number))]
    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), PortError> {
        self.vehicles.save(vehicle).await.map_err(|e| match e {
            DatabaseError::DuplicateEntry(_) => PortError::conflict(format!(
                "lot number {} is already in use",
                vehicle.lot_number
            )),
            other => other.into(),
        })?;
        debug!(id = %vehicle.id, "vehicle saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_vehicle(&self, id: VehicleId) -> Result<(), PortError> {
        Ok(self.vehicles.delete(id).await?)
    }

    async fn purchase_for(&self, vehicle_id: VehicleId) -> Result<Option<Purchase>, PortError> {
        Ok(self.stages.purchase_for(vehicle_id).await?)
    }

    async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, PortError> {
        Ok(self.stages.get_purchase(id).await?)
    }

    async fn save_purchase(&self, purchase: &Purchase) -> Result<(), PortError> {
        self.stages
            .save_purchase(purchase)
            .await
            .map_err(|e| for_vehicle(e, purchase.vehicle_id))
    }

    async fn shipping_for(&self, vehicle_id: VehicleId) -> Result<Option<Shipping>, PortError> {
        Ok(self.stages.shipping_for(vehicle_id).await?)
    }

    async fn get_shipping(&self, id: ShippingId) -> Result<Shipping, PortError> {
        Ok(self.stages.get_shipping(id).await?)
    }

    async fn save_shipping(&self, shipping: &Shipping) -> Result<(), PortError> {
        self.stages
            .save_shipping(shipping)
            .await
            .map_err(|e| for_vehicle(e, shipping.vehicle_id))
    }

    async fn world_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<WorldExpenses>, PortError> {
        Ok(self.stages.world_expenses_for(vehicle_id).await?)
    }

    async fn get_world_expenses(&self, id: WorldExpensesId) -> Result<WorldExpenses, PortError> {
        Ok(self.stages.get_world_expenses(id).await?)
    }

    async fn save_world_expenses(&self, world: &WorldExpenses) -> Result<(), PortError> {
        self.stages
            .save_world_expenses(world)
            .await
            .map_err(|e| for_vehicle(e, world.vehicle_id))
    }

    async fn kabul_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<KabulExpenses>, PortError> {
        Ok(self.stages.kabul_expenses_for(vehicle_id).await?)
    }

    async fn get_kabul_expenses(&self, id: KabulExpensesId) -> Result<KabulExpenses, PortError> {
        Ok(self.stages.get_kabul_expenses(id).await?)
    }

    async fn save_kabul_expenses(&self, kabul: &KabulExpenses) -> Result<(), PortError> {
        self.stages
            .save_kabul_expenses(kabul)
            .await
            .map_err(|e| for_vehicle(e, kabul.vehicle_id))
    }

    async fn repair_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<RepairExpenses>, PortError> {
        Ok(self.stages.repair_expenses_for(vehicle_id).await?)
    }

    async fn get_repair_expenses(&self, id: RepairExpensesId) -> Result<RepairExpenses, PortError> {
        Ok(self.stages.get_repair_expenses(id).await?)
    }

    async fn save_repair_expenses(&self, repair: &RepairExpenses) -> Result<(), PortError> {
        self.stages
            .save_repair_expenses(repair)
            .await
            .map_err(|e| for_vehicle(e, repair.vehicle_id))
    }

    async fn sale_for(&self, vehicle_id: VehicleId) -> Result<Option<SaleInfo>, PortError> {
        Ok(self.stages.sale_for(vehicle_id).await?)
    }

    async fn get_sale(&self, id: SaleId) -> Result<SaleInfo, PortError> {
        Ok(self.stages.get_sale(id).await?)
    }

    #[instrument(skip(self, sale), fields(vehicle_id = %sale.vehicle_id, status = %sale.status.as_str()))]
    async fn save_sale(&self, sale: &SaleInfo) -> Result<(), PortError> {
        self.stages
            .save_sale(sale)
            .await
            .map_err(|e| for_vehicle(e, sale.vehicle_id))
    }

    async fn images_for(&self, vehicle_id: VehicleId) -> Result<Vec<VehicleImage>, PortError> {
        Ok(self.vehicles.images_for(vehicle_id).await?)
    }

    async fn get_image(&self, id: ImageId) -> Result<VehicleImage, PortError> {
        Ok(self.vehicles.get_image(id).await?)
    }

    async fn save_image(&self, image: &VehicleImage) -> Result<(), PortError> {
        self.vehicles
            .insert_image(image)
            .await
            .map_err(|e| for_vehicle(e, image.vehicle_id))
    }

    async fn delete_image(&self, id: ImageId) -> Result<(), PortError> {
        Ok(self.vehicles.delete_image(id).await?)
    }
}

#[async_trait]
impl BuyerPort for PostgresLedgerAdapter {
    async fn list_buyers(&self, name_filter: Option<&str>) -> Result<Vec<Buyer>, PortError> {
        Ok(self.catalog.list_buyers(name_filter).await?)
    }

    async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, PortError> {
        Ok(self.catalog.get_buyer(id).await?)
    }

    async fn save_buyer(&self, buyer: &Buyer) -> Result<(), PortError> {
        Ok(self.catalog.save_buyer(buyer).await?)
    }

    async fn delete_buyer(&self, id: BuyerId) -> Result<(), PortError> {
        Ok(self.catalog.delete_buyer(id).await?)
    }
}

#[async_trait]
impl ReferencePort for PostgresLedgerAdapter {
    async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, PortError> {
        Ok(self.catalog.list_references(kind).await?)
    }

    async fn get_reference(&self, id: ReferenceId) -> Result<ReferenceItem, PortError> {
        Ok(self.catalog.get_reference(id).await?)
    }

    async fn save_reference(&self, item: &ReferenceItem) -> Result<(), PortError> {
        Ok(self.catalog.save_reference(item).await?)
    }

    async fn delete_reference(&self, id: ReferenceId) -> Result<(), PortError> {
        Ok(self.catalog.delete_reference(id).await?)
    }
}

#[async_trait]
impl CurrencyUsagePort for PostgresLedgerAdapter {
    async fn is_currency_in_use(&self, code: &CurrencyCode) -> Result<bool, PortError> {
        Ok(self.stages.currency_in_use(code).await?)
    }
}

#[async_trait]
impl SettingsPort for PostgresLedgerAdapter {
    async fn load_or_create_settings(&self) -> Result<DashboardSettings, PortError> {
        Ok(self.catalog.load_or_create_settings().await?)
    }

    async fn save_settings(&self, settings: &DashboardSettings) -> Result<(), PortError> {
        Ok(self.catalog.save_settings(settings).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_foreign_key_becomes_not_found() {
        let vehicle_id = VehicleId::new();
        let err = DatabaseError::ForeignKeyViolation(
            "insert or update on table \"purchases\" violates foreign key constraint \"purchases_vehicle_id_fkey\"".to_string(),
        );
        assert!(for_vehicle(err, vehicle_id).is_not_found());
    }

    #[test]
    fn test_other_foreign_keys_stay_conflicts() {
        let err = DatabaseError::ForeignKeyViolation("sales_buyer_id_fkey".to_string());
        assert!(matches!(for_vehicle(err, VehicleId::new()), PortError::Conflict { .. }));
    }
}
