//! Display settings shown on every page

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CurrencyId, ValidationErrors};

pub const DEFAULT_SITE_NAME: &str = "Vehicle Ledger";

/// Branding and contact details plus the base currency reference
///
/// There is exactly one record. It is loaded at startup and handed to the
/// components that need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub site_name: String,
    pub logo_path: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub base_currency_id: Option<CurrencyId>,
    pub updated_at: DateTime<Utc>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            logo_path: None,
            address: None,
            email: None,
            phone_number: None,
            base_currency_id: None,
            updated_at: Utc::now(),
        }
    }
}

/// Submitted settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub logo_path: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub base_currency_id: Option<CurrencyId>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DashboardSettings {
    /// Replaces every field with the submitted values
    ///
    /// A blank site name falls back to the default.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let site_name = blank_to_none(update.site_name).unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());
        if site_name.chars().count() > 100 {
            errors.add("site_name", "must be at most 100 characters");
        }
        let email = blank_to_none(update.email);
        if let Some(email) = &email {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
            if !valid {
                errors.add("email", "must be a valid email address");
            }
        }
        let phone_number = blank_to_none(update.phone_number);
        if phone_number.as_ref().is_some_and(|p| p.chars().count() > 20) {
            errors.add("phone_number", "must be at most 20 characters");
        }
        errors.into_result()?;

        self.site_name = site_name;
        self.logo_path = blank_to_none(update.logo_path);
        self.address = blank_to_none(update.address);
        self.email = email;
        self.phone_number = phone_number;
        self.base_currency_id = update.base_currency_id;
        self.updated_at = Utc::now();
        Ok(())
    }
}
