//! Vehicle DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ReferenceId;
use domain_vehicle::{CostReport, VehicleDetails, VehicleDossier, VehicleImage};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct VehicleRequest {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub vin: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub position: String,
    pub related_id: Option<ReferenceId>,
    pub mark_id: Option<ReferenceId>,
    pub car_type_id: Option<ReferenceId>,
    pub model_year_id: Option<ReferenceId>,
    pub color_id: Option<ReferenceId>,
    pub action_id: Option<ReferenceId>,
}

impl From<VehicleRequest> for VehicleDetails {
    fn from(request: VehicleRequest) -> Self {
        VehicleDetails {
            vin: request.vin.trim().to_string(),
            position: request.position.trim().to_string(),
            related_id: request.related_id,
            mark_id: request.mark_id,
            car_type_id: request.car_type_id,
            model_year_id: request.model_year_id,
            color_id: request.color_id,
            action_id: request.action_id,
        }
    }
}

/// A vehicle with its stages, derived figures and images
#[derive(Debug, Serialize)]
pub struct VehicleDetailResponse {
    #[serde(flatten)]
    pub dossier: VehicleDossier,
    pub report: CostReport,
    pub images: Vec<VehicleImage>,
}
