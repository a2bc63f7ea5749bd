//! The vehicle record, root of every ledger stage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{ReferenceId, ValidationErrors, VehicleId};

/// Prefix of every generated lot number
pub const LOT_PREFIX: &str = "LOT-";

/// Generates a lot number: the prefix followed by 8 upper-case hex digits
pub fn generate_lot_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{LOT_PREFIX}{}", hex[..8].to_ascii_uppercase())
}

/// A vehicle and its descriptive catalog references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Unique, assigned on first save and never changed afterwards
    pub lot_number: String,
    pub vin: String,
    pub position: String,
    pub related_id: Option<ReferenceId>,
    pub mark_id: Option<ReferenceId>,
    pub car_type_id: Option<ReferenceId>,
    pub model_year_id: Option<ReferenceId>,
    pub color_id: Option<ReferenceId>,
    pub action_id: Option<ReferenceId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a vehicle record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub position: String,
    pub related_id: Option<ReferenceId>,
    pub mark_id: Option<ReferenceId>,
    pub car_type_id: Option<ReferenceId>,
    pub model_year_id: Option<ReferenceId>,
    pub color_id: Option<ReferenceId>,
    pub action_id: Option<ReferenceId>,
}

impl VehicleDetails {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.vin.chars().count() > 100 {
            errors.add("vin", "must be at most 100 characters");
        }
        if self.position.chars().count() > 100 {
            errors.add("position", "must be at most 100 characters");
        }
        errors.into_result()
    }

    /// Catalog references that are set, with the field each came from
    pub fn references(&self) -> Vec<(&'static str, ReferenceId)> {
        [
            ("related_id", self.related_id),
            ("mark_id", self.mark_id),
            ("car_type_id", self.car_type_id),
            ("model_year_id", self.model_year_id),
            ("color_id", self.color_id),
            ("action_id", self.action_id),
        ]
        .into_iter()
        .filter_map(|(field, id)| id.map(|id| (field, id)))
        .collect()
    }
}

impl Vehicle {
    /// Creates an unsaved vehicle; its lot number is assigned on first save
    pub fn new(details: VehicleDetails) -> Self {
        let now = Utc::now();
        Self {
            id: VehicleId::new_v7(),
            lot_number: String::new(),
            vin: details.vin.trim().to_string(),
            position: details.position.trim().to_string(),
            related_id: details.related_id,
            mark_id: details.mark_id,
            car_type_id: details.car_type_id,
            model_year_id: details.model_year_id,
            color_id: details.color_id,
            action_id: details.action_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields, leaving the lot number alone
    pub fn apply_details(&mut self, details: VehicleDetails) {
        self.vin = details.vin.trim().to_string();
        self.position = details.position.trim().to_string();
        self.related_id = details.related_id;
        self.mark_id = details.mark_id;
        self.car_type_id = details.car_type_id;
        self.model_year_id = details.model_year_id;
        self.color_id = details.color_id;
        self.action_id = details.action_id;
        self.updated_at = Utc::now();
    }

    /// Makes sure the vehicle carries a lot number before it is written
    ///
    /// A lot number that was already persisted always wins over whatever the
    /// in-memory record holds, so clearing the field never causes a new one
    /// to be generated. A fresh number is generated only when neither exists.
    pub fn ensure_lot_number(&mut self, persisted: Option<&str>) {
        match persisted.filter(|lot| !lot.trim().is_empty()) {
            Some(lot) => self.lot_number = lot.to_string(),
            None if self.lot_number.trim().is_empty() => {
                self.lot_number = generate_lot_number();
            }
            None => {}
        }
    }
}
