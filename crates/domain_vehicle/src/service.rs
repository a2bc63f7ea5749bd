//! Vehicle ledger operations
//!
//! [`VehicleLedger`] is the save/validate surface of the ledger. Every stage
//! save loads the current rate book, recomputes the stage's cached figures and
//! writes the stage as one record. Reads go straight to the ports; derived
//! totals are computed on demand through [`CostChain`](crate::chain::CostChain).

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::{BuyerId, CurrencyId, ImageId, ReferenceId, ValidationErrors, VehicleId};
use domain_currency::{CurrencyConverter, CurrencyPort, CurrencyPortExt, RateBook};

use crate::chain::{CostReport, VehicleDossier};
use crate::dashboard::DashboardSummary;
use crate::error::VehicleError;
use crate::image::{ImageStorage, VehicleImage};
use crate::ports::{BuyerPort, ReferencePort, SettingsPort, VehiclePort};
use crate::reference::{NewReferenceItem, ReferenceItem, ReferenceKind};
use crate::sale::{Buyer, NewBuyer, SaleInfo, SaleInput};
use crate::settings::{DashboardSettings, SettingsUpdate};
use crate::stages::{
    KabulExpenses, KabulExpensesInput, Purchase, PurchaseInput, RepairExpenses, RepairExpensesInput,
    Shipping, ShippingInput, WorldExpenses, WorldExpensesInput,
};
use crate::vehicle::{Vehicle, VehicleDetails};

/// Ports the ledger works against
#[derive(Clone)]
pub struct LedgerPorts {
    pub vehicles: Arc<dyn VehiclePort>,
    pub buyers: Arc<dyn BuyerPort>,
    pub references: Arc<dyn ReferencePort>,
    pub settings: Arc<dyn SettingsPort>,
    pub currencies: Arc<dyn CurrencyPort>,
    pub images: Arc<dyn ImageStorage>,
}

/// Application service over vehicles, stages, sales and their catalogs
#[derive(Clone)]
pub struct VehicleLedger {
    ports: LedgerPorts,
}

/// Which catalog kind each vehicle reference field must point at
fn expected_kind(field: &str) -> Option<ReferenceKind> {
    match field {
        "related_id" => Some(ReferenceKind::Related),
        "mark_id" => Some(ReferenceKind::Mark),
        "car_type_id" => Some(ReferenceKind::CarType),
        "model_year_id" => Some(ReferenceKind::ModelYear),
        "color_id" => Some(ReferenceKind::Color),
        "action_id" => Some(ReferenceKind::Action),
        _ => None,
    }
}

impl VehicleLedger {
    pub fn new(ports: LedgerPorts) -> Self {
        Self { ports }
    }

    pub fn ports(&self) -> &LedgerPorts {
        &self.ports
    }

    async fn rate_book(&self) -> Result<RateBook, VehicleError> {
        Ok(self.ports.currencies.load_rate_book().await?)
    }

    // ========================================================================
    // Vehicles
    // ========================================================================

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, VehicleError> {
        Ok(self.ports.vehicles.list_vehicles().await?)
    }

    pub async fn get_vehicle(&self, id: VehicleId) -> Result<Vehicle, VehicleError> {
        Ok(self.ports.vehicles.get_vehicle(id).await?)
    }

    pub async fn find_by_lot(&self, lot_number: &str) -> Result<Vehicle, VehicleError> {
        let lot = lot_number.trim().to_ascii_uppercase();
        self.ports
            .vehicles
            .find_by_lot(&lot)
            .await?
            .ok_or_else(|| VehicleError::not_found("Vehicle", lot))
    }

    /// Checks that every set reference exists and is of the right kind
    async fn check_references(&self, details: &VehicleDetails) -> Result<(), VehicleError> {
        let mut errors = ValidationErrors::new();
        for (field, id) in details.references() {
            match self.ports.references.get_reference(id).await {
                Ok(item) if Some(item.kind) == expected_kind(field) => {}
                Ok(item) => errors.add(field, format!("{} is a {}", item.name, item.kind)),
                Err(err) if err.is_not_found() => errors.add(field, "unknown reference"),
                Err(err) => return Err(err.into()),
            }
        }
        errors.into_result()?;
        Ok(())
    }

    pub async fn create_vehicle(&self, details: VehicleDetails) -> Result<Vehicle, VehicleError> {
        details.validate()?;
        self.check_references(&details).await?;
        self.save_vehicle(Vehicle::new(details)).await
    }

    pub async fn update_vehicle(
        &self,
        id: VehicleId,
        details: VehicleDetails,
    ) -> Result<Vehicle, VehicleError> {
        details.validate()?;
        self.check_references(&details).await?;
        let mut vehicle = self.ports.vehicles.get_vehicle(id).await?;
        vehicle.apply_details(details);
        self.save_vehicle(vehicle).await
    }

    /// Writes a vehicle, assigning its lot number on first save
    ///
    /// The persisted lot number is reloaded before every write, so a record
    /// whose lot was cleared in memory keeps the number it already has.
    #[instrument(skip(self, vehicle), fields(vehicle_id = %vehicle.id))]
    pub async fn save_vehicle(&self, mut vehicle: Vehicle) -> Result<Vehicle, VehicleError> {
        let persisted = match self.ports.vehicles.get_vehicle(vehicle.id).await {
            Ok(existing) => Some(existing.lot_number),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err.into()),
        };
        vehicle.ensure_lot_number(persisted.as_deref());
        self.ports.vehicles.save_vehicle(&vehicle).await?;
        debug!(lot_number = %vehicle.lot_number, "vehicle saved");
        Ok(vehicle)
    }

    /// Deletes a vehicle with its stages, sale and images
    #[instrument(skip(self))]
    pub async fn delete_vehicle(&self, id: VehicleId) -> Result<(), VehicleError> {
        let images = self.ports.vehicles.images_for(id).await?;
        self.ports.vehicles.delete_vehicle(id).await?;
        for image in images {
            if let Err(err) = self.ports.images.remove(&image.path).await {
                warn!(path = %image.path, error = %err, "image file not removed");
            }
        }
        info!("vehicle deleted");
        Ok(())
    }

    // ========================================================================
    // Stages
    // ========================================================================

    pub async fn purchase(&self, vehicle_id: VehicleId) -> Result<Option<Purchase>, VehicleError> {
        Ok(self.ports.vehicles.purchase_for(vehicle_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn save_purchase(
        &self,
        vehicle_id: VehicleId,
        input: PurchaseInput,
    ) -> Result<Purchase, VehicleError> {
        self.ports.vehicles.get_vehicle(vehicle_id).await?;
        let mut purchase = match self.ports.vehicles.purchase_for(vehicle_id).await? {
            Some(mut existing) => {
                existing.apply(input);
                existing
            }
            None => Purchase::new(vehicle_id, input),
        };
        let book = self.rate_book().await?;
        purchase.recalculate(&CurrencyConverter::new(&book));
        self.ports.vehicles.save_purchase(&purchase).await?;
        debug!(remain_purchase = %purchase.remain_purchase, "purchase saved");
        Ok(purchase)
    }

    pub async fn shipping(&self, vehicle_id: VehicleId) -> Result<Option<Shipping>, VehicleError> {
        Ok(self.ports.vehicles.shipping_for(vehicle_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn save_shipping(
        &self,
        vehicle_id: VehicleId,
        input: ShippingInput,
    ) -> Result<Shipping, VehicleError> {
        self.ports.vehicles.get_vehicle(vehicle_id).await?;
        let shipping = match self.ports.vehicles.shipping_for(vehicle_id).await? {
            Some(mut existing) => {
                existing.apply(input);
                existing
            }
            None => Shipping::new(vehicle_id, input),
        };
        self.ports.vehicles.save_shipping(&shipping).await?;
        debug!("shipping saved");
        Ok(shipping)
    }

    pub async fn world_expenses(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<WorldExpenses>, VehicleError> {
        Ok(self.ports.vehicles.world_expenses_for(vehicle_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn save_world_expenses(
        &self,
        vehicle_id: VehicleId,
        input: WorldExpensesInput,
    ) -> Result<WorldExpenses, VehicleError> {
        let fields = input.validate()?;
        self.ports.vehicles.get_vehicle(vehicle_id).await?;
        let mut world = match self.ports.vehicles.world_expenses_for(vehicle_id).await? {
            Some(mut existing) => {
                existing.apply(fields);
                existing
            }
            None => WorldExpenses::new(vehicle_id, fields),
        };
        let book = self.rate_book().await?;
        world.recalculate(&CurrencyConverter::new(&book));
        self.ports.vehicles.save_world_expenses(&world).await?;
        debug!(remain_shipping = %world.remain_shipping, "world expenses saved");
        Ok(world)
    }

    pub async fn kabul_expenses(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<KabulExpenses>, VehicleError> {
        Ok(self.ports.vehicles.kabul_expenses_for(vehicle_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn save_kabul_expenses(
        &self,
        vehicle_id: VehicleId,
        input: KabulExpensesInput,
    ) -> Result<KabulExpenses, VehicleError> {
        let fields = input.validate()?;
        self.ports.vehicles.get_vehicle(vehicle_id).await?;
        let kabul = match self.ports.vehicles.kabul_expenses_for(vehicle_id).await? {
            Some(mut existing) => {
                existing.apply(fields);
                existing
            }
            None => KabulExpenses::new(vehicle_id, fields),
        };
        self.ports.vehicles.save_kabul_expenses(&kabul).await?;
        debug!("kabul expenses saved");
        Ok(kabul)
    }

    pub async fn repair_expenses(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<RepairExpenses>, VehicleError> {
        Ok(self.ports.vehicles.repair_expenses_for(vehicle_id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn save_repair_expenses(
        &self,
        vehicle_id: VehicleId,
        input: RepairExpensesInput,
    ) -> Result<RepairExpenses, VehicleError> {
        self.ports.vehicles.get_vehicle(vehicle_id).await?;
        let repair = match self.ports.vehicles.repair_expenses_for(vehicle_id).await? {
            Some(mut existing) => {
                existing.apply(input);
                existing
            }
            None => RepairExpenses::new(vehicle_id, input),
        };
        self.ports.vehicles.save_repair_expenses(&repair).await?;
        debug!("repair expenses saved");
        Ok(repair)
    }

    pub async fn sale(&self, vehicle_id: VehicleId) -> Result<Option<SaleInfo>, VehicleError> {
        Ok(self.ports.vehicles.sale_for(vehicle_id).await?)
    }

    /// Saves the sale record
    ///
    /// A sold vehicle needs a price, a date and an existing buyer. Any other
    /// status has its price replaced by the current final cost.
    #[instrument(skip(self, input))]
    pub async fn save_sale(
        &self,
        vehicle_id: VehicleId,
        input: SaleInput,
    ) -> Result<SaleInfo, VehicleError> {
        let dossier = self.ports.vehicles.load_dossier(vehicle_id).await?;
        let mut sale = match dossier.sale.clone() {
            Some(mut existing) => {
                existing.apply(input);
                existing
            }
            None => SaleInfo::new(vehicle_id, input),
        };
        sale.validate()?;
        if let Some(buyer_id) = sale.buyer_id {
            self.ports.buyers.get_buyer(buyer_id).await?;
        }

        let book = self.rate_book().await?;
        let converter = CurrencyConverter::new(&book);
        let final_cost = dossier.chain(converter).final_cost();
        sale.sync_valuation(final_cost, converter.base_code());

        self.ports.vehicles.save_sale(&sale).await?;
        info!(status = %sale.status, sale_price = %sale.sale_price.amount, "sale saved");
        Ok(sale)
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    pub async fn dossier(&self, vehicle_id: VehicleId) -> Result<VehicleDossier, VehicleError> {
        Ok(self.ports.vehicles.load_dossier(vehicle_id).await?)
    }

    /// Every derived figure of one vehicle at the current rates
    pub async fn cost_report(&self, vehicle_id: VehicleId) -> Result<CostReport, VehicleError> {
        let dossier = self.ports.vehicles.load_dossier(vehicle_id).await?;
        let book = self.rate_book().await?;
        Ok(dossier.chain(CurrencyConverter::new(&book)).report())
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, VehicleError> {
        let dossiers = self.ports.vehicles.list_dossiers().await?;
        let book = self.rate_book().await?;
        Ok(DashboardSummary::compute(&dossiers, CurrencyConverter::new(&book)))
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Stores the file and records it against the vehicle
    #[instrument(skip(self, bytes, description), fields(size = bytes.len()))]
    pub async fn attach_image(
        &self,
        vehicle_id: VehicleId,
        file_name: &str,
        bytes: &[u8],
        description: impl Into<String>,
    ) -> Result<VehicleImage, VehicleError> {
        if bytes.is_empty() {
            return Err(VehicleError::validation("image", "file is empty"));
        }
        self.ports.vehicles.get_vehicle(vehicle_id).await?;
        let id = ImageId::new_v7();
        let path = self.ports.images.store(id, file_name, bytes).await?;
        let image = VehicleImage {
            id,
            vehicle_id,
            path,
            description: description.into().trim().to_string(),
            uploaded_at: chrono::Utc::now(),
        };
        if let Err(err) = self.ports.vehicles.save_image(&image).await {
            if let Err(cleanup) = self.ports.images.remove(&image.path).await {
                warn!(path = %image.path, error = %cleanup, "orphaned image file not removed");
            }
            return Err(err.into());
        }
        info!(image_id = %image.id, "image attached");
        Ok(image)
    }

    pub async fn list_images(&self, vehicle_id: VehicleId) -> Result<Vec<VehicleImage>, VehicleError> {
        Ok(self.ports.vehicles.images_for(vehicle_id).await?)
    }

    /// Deletes the image record, then its file
    ///
    /// Once the record is gone a file that cannot be removed is only logged.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, id: ImageId) -> Result<(), VehicleError> {
        let image = self.ports.vehicles.get_image(id).await?;
        self.ports.vehicles.delete_image(id).await?;
        if let Err(err) = self.ports.images.remove(&image.path).await {
            warn!(path = %image.path, error = %err, "image file not removed");
        }
        info!(image_id = %id, "image deleted");
        Ok(())
    }

    // ========================================================================
    // Buyers
    // ========================================================================

    pub async fn list_buyers(&self, name_filter: Option<&str>) -> Result<Vec<Buyer>, VehicleError> {
        let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());
        Ok(self.ports.buyers.list_buyers(filter).await?)
    }

    pub async fn get_buyer(&self, id: BuyerId) -> Result<Buyer, VehicleError> {
        Ok(self.ports.buyers.get_buyer(id).await?)
    }

    pub async fn create_buyer(&self, request: NewBuyer) -> Result<Buyer, VehicleError> {
        let buyer = Buyer::create(request)?;
        self.ports.buyers.save_buyer(&buyer).await?;
        info!(buyer_id = %buyer.id, "buyer created");
        Ok(buyer)
    }

    pub async fn update_buyer(&self, id: BuyerId, request: NewBuyer) -> Result<Buyer, VehicleError> {
        let mut buyer = self.ports.buyers.get_buyer(id).await?;
        buyer.apply(request)?;
        self.ports.buyers.save_buyer(&buyer).await?;
        Ok(buyer)
    }

    pub async fn delete_buyer(&self, id: BuyerId) -> Result<(), VehicleError> {
        Ok(self.ports.buyers.delete_buyer(id).await?)
    }

    // ========================================================================
    // Reference catalog
    // ========================================================================

    pub async fn list_references(&self, kind: ReferenceKind) -> Result<Vec<ReferenceItem>, VehicleError> {
        Ok(self.ports.references.list_references(kind).await?)
    }

    pub async fn get_reference(&self, id: ReferenceId) -> Result<ReferenceItem, VehicleError> {
        Ok(self.ports.references.get_reference(id).await?)
    }

    async fn check_parent(&self, item: &ReferenceItem) -> Result<(), VehicleError> {
        let Some(parent_id) = item.parent_id else {
            return Ok(());
        };
        match self.ports.references.get_reference(parent_id).await {
            Ok(parent) if parent.kind == ReferenceKind::Mark => Ok(()),
            Ok(_) => Err(VehicleError::validation("parent_id", "parent must be a mark")),
            Err(err) if err.is_not_found() => {
                Err(VehicleError::validation("parent_id", "unknown mark"))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn create_reference(
        &self,
        kind: ReferenceKind,
        request: NewReferenceItem,
    ) -> Result<ReferenceItem, VehicleError> {
        let item = ReferenceItem::create(kind, request)?;
        self.check_parent(&item).await?;
        self.ports.references.save_reference(&item).await?;
        debug!(kind = %item.kind, name = %item.name, "reference created");
        Ok(item)
    }

    /// Renames an item or moves a car type to another mark
    pub async fn update_reference(
        &self,
        id: ReferenceId,
        request: NewReferenceItem,
    ) -> Result<ReferenceItem, VehicleError> {
        let existing = self.ports.references.get_reference(id).await?;
        let mut item = ReferenceItem::create(existing.kind, request)?;
        item.id = existing.id;
        item.created_at = existing.created_at;
        self.check_parent(&item).await?;
        self.ports.references.save_reference(&item).await?;
        Ok(item)
    }

    pub async fn delete_reference(&self, id: ReferenceId) -> Result<(), VehicleError> {
        Ok(self.ports.references.delete_reference(id).await?)
    }

    // ========================================================================
    // Display settings
    // ========================================================================

    pub async fn settings(&self) -> Result<DashboardSettings, VehicleError> {
        Ok(self.ports.settings.load_or_create_settings().await?)
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<DashboardSettings, VehicleError> {
        if let Some(currency_id) = update.base_currency_id {
            self.require_currency(currency_id).await?;
        }
        let mut settings = self.ports.settings.load_or_create_settings().await?;
        settings.apply(update)?;
        self.ports.settings.save_settings(&settings).await?;
        info!(site_name = %settings.site_name, "settings updated");
        Ok(settings)
    }

    async fn require_currency(&self, id: CurrencyId) -> Result<(), VehicleError> {
        match self.ports.currencies.get_currency(id).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                Err(VehicleError::validation("base_currency_id", "unknown currency"))
            }
            Err(err) => Err(err.into()),
        }
    }
}
