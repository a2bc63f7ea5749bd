//! Vehicle Ledger Ports
//!
//! Port traits for everything the ledger persists. The PostgreSQL adapters
//! live in `infra_db`; [`mock::InMemoryVehicleStore`] implements every port
//! in memory for tests.
//!
//! Stage saves are upserts keyed by vehicle: a vehicle has at most one record
//! of each stage.

use async_trait::async_trait;

use core_kernel::{
    BuyerId, DomainPort, HealthCheckable, ImageId, KabulExpensesId, PortError, PurchaseId,
    ReferenceId, RepairExpensesId, SaleId, ShippingId, VehicleId, WorldExpensesId,
};

use crate::chain::VehicleDossier;
use crate::image::VehicleImage;
use crate::reference::{ReferenceItem, ReferenceKind};
use crate::sale::{Buyer, SaleInfo};
use crate::settings::DashboardSettings;
use crate::stages::{KabulExpenses, Purchase, RepairExpenses, Shipping, WorldExpenses};
use crate::vehicle::Vehicle;

/// Port for vehicles, their stages and their images
#[async_trait]
pub trait VehiclePort: DomainPort + HealthCheckable {
    // ========================================================================
    // Vehicle records
    // ========================================================================

    /// Lists vehicles, newest first
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, PortError>;

    async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle, PortError>;

    async fn find_by_lot(&self, lot_number: &str) -> Result<Option<Vehicle>, PortError>;

    /// Inserts or updates a vehicle; a lot number held by another vehicle
    /// is a `PortError::Conflict`
    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), PortError>;

    /// Deletes a vehicle with all of its stages, sale and image records
    async fn delete_vehicle(&self, id: VehicleId) -> Result<(), PortError>;

    // ========================================================================
    // Stages
    // ========================================================================

    async fn purchase_for(&self, vehicle_id: VehicleId) -> Result<Option<Purchase>, PortError>;
    async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, PortError>;
    async fn save_purchase(&self, purchase: &Purchase) -> Result<(), PortError>;

    async fn shipping_for(&self, vehicle_id: VehicleId) -> Result<Option<Shipping>, PortError>;
    async fn get_shipping(&self, id: ShippingId) -> Result<Shipping, PortError>;
    async fn save_shipping(&self, shipping: &Shipping) -> Result<(), PortError>;

    async fn world_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<WorldExpenses>, PortError>;
    async fn get_world_expenses(&self, id: WorldExpensesId) -> Result<WorldExpenses, PortError>;
    async fn save_world_expenses(&self, world: &WorldExpenses) -> Result<(), PortError>;

    async fn kabul_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<KabulExpenses>, PortError>;
    async fn get_kabul_expenses(&self, id: KabulExpensesId) -> Result<KabulExpenses, PortError>;
    async fn save_kabul_expenses(&self, kabul: &KabulExpenses) -> Result<(), PortError>;

    async fn repair_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<RepairExpenses>, PortError>;
    async fn get_repair_expenses(&self, id: RepairExpensesId) -> Result<RepairExpenses, PortError>;
    async fn save_repair_expenses(&self, repair: &RepairExpenses) -> Result<(), PortError>;

    async fn sale_for(&self, vehicle_id: VehicleId) -> Result<Option<SaleInfo>, PortError>;
    async fn get_sale(&self, id: SaleId) -> Result<SaleInfo, PortError>;
    async fn save_sale(&self, sale: &SaleInfo) -> Result<(), PortError>;

    // ========================================================================
    // Images
    // ========================================================================

    /// Images of a vehicle, oldest upload first
    async fn images_for(&self, vehicle_id: VehicleId) -> Result<Vec<VehicleImage>, PortError>;
    async fn get_image(&self, id: ImageId) -> Result<VehicleImage, PortError>;
    async fn save_image(&self, image: &VehicleImage) -> Result<(), PortError>;
    async fn delete_image(&self, id: ImageId) -> Result<(), PortError>;

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Loads a vehicle with every stage recorded for it
    async fn load_dossier(&self, id: VehicleId) -> Result<VehicleDossier, PortError> {
        let vehicle = self.get_vehicle(id).await?;
        Ok(VehicleDossier {
            vehicle,
            purchase: self.purchase_for(id).await?,
            shipping: self.shipping_for(id).await?,
            world_expenses: self.world_expenses_for(id).await?,
            kabul_expenses: self.kabul_expenses_for(id).await?,
            repair_expenses: self.repair_expenses_for(id).await?,
            sale: self.sale_for(id).await?,
        })
    }

    /// Loads every vehicle's dossier, newest vehicle first
    async fn list_dossiers(&self) -> Result<Vec<VehicleDossier>, PortError> {
        let mut dossiers = Vec::new();
        for vehicle in self.list_vehicles().await? {
            dossiers.push(self.load_dossier(vehicle.id).await?);
        }
        Ok(dossiers)
    }
}

/// Port for buyers
#[async_trait]
pub trait BuyerPort: DomainPort {
    /// Buyers ordered by name, optionally filtered by a case-insensitive
    /// name fragment
    async fn list_buyers(&self, name_filter: Option<&str>) -> Result<Vec<Buyer>, PortError>;
    async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, PortError>;
    async fn save_buyer(&self, buyer: &Buyer) -> Result<(), PortError>;
    /// Sales that referenced the buyer keep their record without a buyer
    async fn delete_buyer(&self, id: BuyerId) -> Result<(), PortError>;
}

/// Port for the reference catalog
#[async_trait]
pub trait ReferencePort: DomainPort {
    /// Items of one kind ordered by name
    async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, PortError>;
    async fn get_reference(&self, id: ReferenceId) -> Result<ReferenceItem, PortError>;
    async fn save_reference(&self, item: &ReferenceItem) -> Result<(), PortError>;
    /// Vehicles pointing at the item lose the reference; deleting a mark
    /// deletes its car types
    async fn delete_reference(&self, id: ReferenceId) -> Result<(), PortError>;
}

/// Port for the display settings record
#[async_trait]
pub trait SettingsPort: DomainPort {
    /// Returns the settings, writing defaults first when none exist
    async fn load_or_create_settings(&self) -> Result<DashboardSettings, PortError>;
    async fn save_settings(&self, settings: &DashboardSettings) -> Result<(), PortError>;
}

/// In-memory implementation of every ledger port
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{CurrencyCode, HealthCheckResult};
    use domain_currency::CurrencyUsagePort;

    #[derive(Debug, Default)]
    struct State {
        vehicles: HashMap<VehicleId, Vehicle>,
        purchases: HashMap<VehicleId, Purchase>,
        shipments: HashMap<VehicleId, Shipping>,
        world_expenses: HashMap<VehicleId, WorldExpenses>,
        kabul_expenses: HashMap<VehicleId, KabulExpenses>,
        repair_expenses: HashMap<VehicleId, RepairExpenses>,
        sales: HashMap<VehicleId, SaleInfo>,
        images: HashMap<ImageId, VehicleImage>,
        buyers: HashMap<BuyerId, Buyer>,
        references: HashMap<ReferenceId, ReferenceItem>,
        settings: Option<DashboardSettings>,
    }

    impl State {
        fn require_vehicle(&self, id: VehicleId) -> Result<(), PortError> {
            if self.vehicles.contains_key(&id) {
                Ok(())
            } else {
                Err(PortError::not_found("Vehicle", id))
            }
        }
    }

    /// Ledger store kept in memory
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryVehicleStore {
        state: Arc<RwLock<State>>,
    }

    impl InMemoryVehicleStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for InMemoryVehicleStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryVehicleStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-vehicle-store", 0)
        }
    }

    type Pick<T> = fn(&State) -> &HashMap<VehicleId, T>;
    type PickMut<T> = fn(&mut State) -> &mut HashMap<VehicleId, T>;

    impl InMemoryVehicleStore {
        async fn stage_for<T: Clone + Send + Sync>(&self, pick: Pick<T>, vehicle_id: VehicleId) -> Option<T> {
            pick(&*self.state.read().await).get(&vehicle_id).cloned()
        }

        async fn find_stage<T: Clone + Send + Sync>(
            &self,
            pick: Pick<T>,
            matches: impl Fn(&T) -> bool + Send,
        ) -> Option<T> {
            pick(&*self.state.read().await).values().find(|s| matches(s)).cloned()
        }

        async fn put_stage<T: Clone + Send + Sync>(
            &self,
            pick: PickMut<T>,
            vehicle_id: VehicleId,
            stage: &T,
        ) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.require_vehicle(vehicle_id)?;
            pick(&mut *state).insert(vehicle_id, stage.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl CurrencyUsagePort for InMemoryVehicleStore {
        async fn is_currency_in_use(&self, code: &CurrencyCode) -> Result<bool, PortError> {
            let state = self.state.read().await;
            Ok(state.purchases.values().any(|s| s.uses_currency(code))
                || state.shipments.values().any(|s| s.uses_currency(code))
                || state.world_expenses.values().any(|s| s.uses_currency(code))
                || state.kabul_expenses.values().any(|s| s.uses_currency(code))
                || state.repair_expenses.values().any(|s| s.uses_currency(code))
                || state.sales.values().any(|s| s.uses_currency(code)))
        }
    }

    #[async_trait]
    impl VehiclePort for InMemoryVehicleStore {
        async fn list_vehicles(&self) -> Result<Vec<Vehicle>, PortError> {
            let state = self.state.read().await;
            let mut vehicles: Vec<_> = state.vehicles.values().cloned().collect();
            vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(vehicles)
        }

        async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle, PortError> {
            self.state
                .read()
                .await
                .vehicles
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Vehicle", id))
        }

        async fn find_by_lot(&self, lot_number: &str) -> Result<Option<Vehicle>, PortError> {
            let state = self.state.read().await;
            Ok(state
                .vehicles
                .values()
                .find(|v| v.lot_number == lot_number)
                .cloned())
        }

        async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state
                .vehicles
                .values()
                .any(|v| v.id != vehicle.id && v.lot_number == vehicle.lot_number)
            {
                return Err(PortError::conflict(format!(
                    "lot number {} already exists",
                    vehicle.lot_number
                )));
            }
            state.vehicles.insert(vehicle.id, vehicle.clone());
            Ok(())
        }

        async fn delete_vehicle(&self, id: VehicleId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.vehicles.remove(&id).is_none() {
                return Err(PortError::not_found("Vehicle", id));
            }
            state.purchases.remove(&id);
            state.shipments.remove(&id);
            state.world_expenses.remove(&id);
            state.kabul_expenses.remove(&id);
            state.repair_expenses.remove(&id);
            state.sales.remove(&id);
            state.images.retain(|_, image| image.vehicle_id != id);
            Ok(())
        }

        async fn purchase_for(&self, vehicle_id: VehicleId) -> Result<Option<Purchase>, PortError> {
            Ok(self.stage_for(|s| &s.purchases, vehicle_id).await)
        }

        async fn get_purchase(&self, id: PurchaseId) -> Result<Purchase, PortError> {
            self.find_stage(|s| &s.purchases, |stage| stage.id == id)
                .await
                .ok_or_else(|| PortError::not_found("Purchase", id))
        }

        async fn save_purchase(&self, purchase: &Purchase) -> Result<(), PortError> {
            self.put_stage(|s| &mut s.purchases, purchase.vehicle_id, purchase).await
        }

        async fn shipping_for(&self, vehicle_id: VehicleId) -> Result<Option<Shipping>, PortError> {
            Ok(self.stage_for(|s| &s.shipments, vehicle_id).await)
        }

        async fn get_shipping(&self, id: ShippingId) -> Result<Shipping, PortError> {
            self.find_stage(|s| &s.shipments, |stage| stage.id == id)
                .await
                .ok_or_else(|| PortError::not_found("Shipping", id))
        }

        async fn save_shipping(&self, shipping: &Shipping) -> Result<(), PortError> {
            self.put_stage(|s| &mut s.shipments, shipping.vehicle_id, shipping).await
        }

        async fn world_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<WorldExpenses>, PortError> {
            Ok(self.stage_for(|s| &s.world_expenses, vehicle_id).await)
        }

        async fn get_world_expenses(&self, id: WorldExpensesId) -> Result<WorldExpenses, PortError> {
            self.find_stage(|s| &s.world_expenses, |stage| stage.id == id)
                .await
                .ok_or_else(|| PortError::not_found("WorldExpenses", id))
        }

        async fn save_world_expenses(&self, world: &WorldExpenses) -> Result<(), PortError> {
            self.put_stage(|s| &mut s.world_expenses, world.vehicle_id, world).await
        }

        async fn kabul_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<KabulExpenses>, PortError> {
            Ok(self.stage_for(|s| &s.kabul_expenses, vehicle_id).await)
        }

        async fn get_kabul_expenses(&self, id: KabulExpensesId) -> Result<KabulExpenses, PortError> {
            self.find_stage(|s| &s.kabul_expenses, |stage| stage.id == id)
                .await
                .ok_or_else(|| PortError::not_found("KabulExpenses", id))
        }

        async fn save_kabul_expenses(&self, kabul: &KabulExpenses) -> Result<(), PortError> {
            self.put_stage(|s| &mut s.kabul_expenses, kabul.vehicle_id, kabul).await
        }

        async fn repair_expenses_for(&self, vehicle_id: VehicleId) -> Result<Option<RepairExpenses>, PortError> {
            Ok(self.stage_for(|s| &s.repair_expenses, vehicle_id).await)
        }

        async fn get_repair_expenses(&self, id: RepairExpensesId) -> Result<RepairExpenses, PortError> {
            self.find_stage(|s| &s.repair_expenses, |stage| stage.id == id)
                .await
                .ok_or_else(|| PortError::not_found("RepairExpenses", id))
        }

        async fn save_repair_expenses(&self, repair: &RepairExpenses) -> Result<(), PortError> {
            self.put_stage(|s| &mut s.repair_expenses, repair.vehicle_id, repair).await
        }

        async fn sale_for(&self, vehicle_id: VehicleId) -> Result<Option<SaleInfo>, PortError> {
            Ok(self.stage_for(|s| &s.sales, vehicle_id).await)
        }

        async fn get_sale(&self, id: SaleId) -> Result<SaleInfo, PortError> {
            self.find_stage(|s| &s.sales, |stage| stage.id == id)
                .await
                .ok_or_else(|| PortError::not_found("Sale", id))
        }

        async fn save_sale(&self, sale: &SaleInfo) -> Result<(), PortError> {
            self.put_stage(|s| &mut s.sales, sale.vehicle_id, sale).await
        }

        async fn images_for(&self, vehicle_id: VehicleId) -> Result<Vec<VehicleImage>, PortError> {
            let state = self.state.read().await;
            let mut images: Vec<_> = state
                .images
                .values()
                .filter(|image| image.vehicle_id == vehicle_id)
                .cloned()
                .collect();
            images.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
            Ok(images)
        }

        async fn get_image(&self, id: ImageId) -> Result<VehicleImage, PortError> {
            self.state
                .read()
                .await
                .images
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Image", id))
        }

        async fn save_image(&self, image: &VehicleImage) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.require_vehicle(image.vehicle_id)?;
            state.images.insert(image.id, image.clone());
            Ok(())
        }

        async fn delete_image(&self, id: ImageId) -> Result<(), PortError> {
            match self.state.write().await.images.remove(&id) {
                Some(_) => Ok(()),
                None => Err(PortError::not_found("Image", id)),
            }
        }
    }

    #[async_trait]
    impl BuyerPort for InMemoryVehicleStore {
        async fn list_buyers(&self, name_filter: Option<&str>) -> Result<Vec<Buyer>, PortError> {
            let state = self.state.read().await;
            let mut buyers: Vec<_> = state
                .buyers
                .values()
                .filter(|b| name_filter.map_or(true, |f| b.name_matches(f)))
                .cloned()
                .collect();
            buyers.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(buyers)
        }

        async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, PortError> {
            self.state
                .read()
                .await
                .buyers
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Buyer", id))
        }

        async fn save_buyer(&self, buyer: &Buyer) -> Result<(), PortError> {
            self.state.write().await.buyers.insert(buyer.id, buyer.clone());
            Ok(())
        }

        async fn delete_buyer(&self, id: BuyerId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.buyers.remove(&id).is_none() {
                return Err(PortError::not_found("Buyer", id));
            }
            for sale in state.sales.values_mut() {
                if sale.buyer_id == Some(id) {
                    sale.buyer_id = None;
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ReferencePort for InMemoryVehicleStore {
        async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, PortError> {
            let state = self.state.read().await;
            let mut items: Vec<_> = state
                .references
                .values()
                .filter(|item| item.kind == kind)
                .cloned()
                .collect();
            items.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(items)
        }

        async fn get_reference(&self, id: ReferenceId) -> Result<ReferenceItem, PortError> {
            self.state
                .read()
                .await
                .references
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Reference", id))
        }

        async fn save_reference(&self, item: &ReferenceItem) -> Result<(), PortError> {
            self.state.write().await.references.insert(item.id, item.clone());
            Ok(())
        }

        async fn delete_reference(&self, id: ReferenceId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.references.remove(&id).is_none() {
                return Err(PortError::not_found("Reference", id));
            }
            let children: Vec<ReferenceId> = state
                .references
                .values()
                .filter(|item| item.parent_id == Some(id))
                .map(|item| item.id)
                .collect();
            for child in &children {
                state.references.remove(child);
            }
            let gone = |r: &Option<ReferenceId>| matches!(r, Some(x) if *x == id || children.contains(x));
            for vehicle in state.vehicles.values_mut() {
                for field in [
                    &mut vehicle.related_id,
                    &mut vehicle.mark_id,
                    &mut vehicle.car_type_id,
                    &mut vehicle.model_year_id,
                    &mut vehicle.color_id,
                    &mut vehicle.action_id,
                ] {
                    if gone(field) {
                        *field = None;
                    }
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SettingsPort for InMemoryVehicleStore {
        async fn load_or_create_settings(&self) -> Result<DashboardSettings, PortError> {
            let mut state = self.state.write().await;
            Ok(state.settings.get_or_insert_with(DashboardSettings::default).clone())
        }

        async fn save_settings(&self, settings: &DashboardSettings) -> Result<(), PortError> {
            self.state.write().await.settings = Some(settings.clone());
            Ok(())
        }
    }
}
