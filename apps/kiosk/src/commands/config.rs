//! # Config Commands

use serde::Serialize;
use tracing::debug;

use crate::state::KioskConfig;

/// What the frontend needs from the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub store_name: String,
    pub server_url: String,
    /// Percent, for display (`8.25`)
    pub tax_rate: f64,
    pub duplicate_policy: boba_core::DuplicatePolicy,
    pub durable_cart: bool,
}

/// Gets the current kiosk configuration.
///
/// ## When Used
/// - Kiosk startup (store name in the header)
/// - Cart summary (tax line label)
pub fn get_config(config: &KioskConfig) -> ConfigView {
    debug!("get_config command");
    ConfigView {
        store_name: config.store_name.clone(),
        server_url: config.server_url.clone(),
        tax_rate: config.tax_rate().percentage(),
        duplicate_policy: config.duplicate_policy,
        durable_cart: config.storage_path.is_some(),
    }
}
