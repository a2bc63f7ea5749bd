//! Buyer, reference catalog and settings DTOs

use serde::Deserialize;
use validator::Validate;

use core_kernel::{CurrencyId, ReferenceId};
use domain_vehicle::{NewBuyer, NewReferenceItem, SettingsUpdate};

#[derive(Debug, Deserialize, Validate)]
pub struct BuyerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub national_id: String,
    #[serde(default)]
    pub additional_info: String,
}

impl From<BuyerRequest> for NewBuyer {
    fn from(request: BuyerRequest) -> Self {
        NewBuyer {
            name: request.name,
            contact_info: request.contact_info,
            address: request.address,
            national_id: request.national_id,
            additional_info: request.additional_info,
        }
    }
}

/// `GET /buyers` parameters
#[derive(Debug, Default, Deserialize)]
pub struct BuyerQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReferenceRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub parent_id: Option<ReferenceId>,
}

impl From<ReferenceRequest> for NewReferenceItem {
    fn from(request: ReferenceRequest) -> Self {
        NewReferenceItem {
            name: request.name,
            parent_id: request.parent_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SettingsRequest {
    #[validate(length(max = 100))]
    pub site_name: Option<String>,
    #[validate(length(max = 255))]
    pub logo_path: Option<String>,
    pub address: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    pub base_currency_id: Option<CurrencyId>,
}

impl From<SettingsRequest> for SettingsUpdate {
    fn from(request: SettingsRequest) -> Self {
        SettingsUpdate {
            site_name: request.site_name,
            logo_path: request.logo_path,
            address: request.address,
            email: request.email,
            phone_number: request.phone_number,
            base_currency_id: request.base_currency_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_email_checked() {
        let request = SettingsRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_blank_buyer_name_rejected() {
        let request = BuyerRequest {
            name: String::new(),
            contact_info: String::new(),
            address: String::new(),
            national_id: String::new(),
            additional_info: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
