//! # Kiosk Configuration
//!
//! ## Configuration Sources (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file: `kiosk.toml` in the platform config directory
//!    (`~/.config/boba-pos/kiosk.toml` on Linux) or an explicit path
//! 3. Environment variables (`BOBA_*`)
//!
//! ```toml
//! # kiosk.toml
//! store_name = "Boba Downtown"
//! server_url = "http://192.168.1.20:3000/"
//! tax_rate_bps = 825
//! storage_path = "/var/lib/boba/kiosk.db"
//! cart_key = "cart"
//! duplicate_policy = "legacy"
//! request_timeout_secs = 10
//! ```

use boba_core::validation::validate_tax_rate_bps;
use boba_core::{DuplicatePolicy, TaxRate, CART_STORAGE_KEY, DEFAULT_TAX_RATE_BPS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to save config: {0}")]
    Save(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Kiosk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Shown on the kiosk header and receipts
    pub store_name: String,

    /// Base URL of the order server
    pub server_url: String,

    /// Sales tax in basis points (825 = 8.25%)
    pub tax_rate_bps: u32,

    /// SQLite file for the durable cart. `None` keeps the cart in memory.
    pub storage_path: Option<PathBuf>,

    /// Storage key the cart document lives under
    pub cart_key: String,

    pub duplicate_policy: DuplicatePolicy,

    pub request_timeout_secs: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        KioskConfig {
            store_name: "Boba POS".to_string(),
            server_url: "http://localhost:3000/".to_string(),
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            storage_path: Self::default_storage_path(),
            cart_key: CART_STORAGE_KEY.to_string(),
            duplicate_policy: DuplicatePolicy::default(),
            request_timeout_secs: 10,
        }
    }
}

impl KioskConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading kiosk config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Save("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Save(e.to_string()))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Save(e.to_string()))?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::Save(e.to_string()))?;

        info!(?path, "Kiosk config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.server_base_url()?;

        validate_tax_rate_bps(self.tax_rate_bps)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.cart_key.trim().is_empty() {
            return Err(ConfigError::Invalid("cart_key must not be empty".into()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `BOBA_*` overrides from `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("BOBA_SERVER_URL") {
            debug!(url = %url, "Overriding server URL from environment");
            self.server_url = url;
        }

        if let Some(rate) = var("BOBA_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) => self.tax_rate_bps = TaxRate::from_percentage(pct).bps(),
                Err(_) => warn!(rate = %rate, "Ignoring unparseable BOBA_TAX_RATE"),
            }
        }

        if let Some(path) = var("BOBA_STORAGE_PATH") {
            self.storage_path = match path.trim() {
                "" | ":memory:" => None,
                path => Some(PathBuf::from(path)),
            };
        }

        if let Some(key) = var("BOBA_CART_KEY") {
            self.cart_key = key;
        }

        if let Some(policy) = var("BOBA_DUPLICATE_POLICY") {
            match policy.parse() {
                Ok(parsed) => self.duplicate_policy = parsed,
                Err(e) => warn!(policy = %policy, "Ignoring BOBA_DUPLICATE_POLICY: {}", e),
            }
        }

        if let Some(secs) = var("BOBA_REQUEST_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!(secs = %secs, "Ignoring unparseable BOBA_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "boba", "pos")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("kiosk.toml"))
    }

    fn default_storage_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("kiosk.db"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The parsed server URL, always ending in `/` so endpoint paths join
    /// onto it.
    pub fn server_base_url(&self) -> ConfigResult<Url> {
        let mut raw = self.server_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url =
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "server_url must be http:// or https://, got: {}",
                self.server_url
            )));
        }
        Ok(url)
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = KioskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tax_rate(), TaxRate::from_bps(825));
        assert_eq!(config.cart_key, "cart");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Legacy);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = KioskConfig::default();
        config
            .apply_overrides(vars(&[
                ("BOBA_SERVER_URL", "https://orders.boba.shop/"),
                ("BOBA_TAX_RATE", "9.5"),
                ("BOBA_STORAGE_PATH", ":memory:"),
                ("BOBA_DUPLICATE_POLICY", "all_customizations"),
                ("BOBA_REQUEST_TIMEOUT_SECS", "not-a-number"),
            ]));

        assert_eq!(config.server_url, "https://orders.boba.shop/");
        assert_eq!(config.tax_rate_bps, 950);
        assert_eq!(config.storage_path, None);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::AllCustomizations);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_bad_url_override_fails_validation() {
        let mut config = KioskConfig::default();
        config.apply_overrides(vars(&[("BOBA_SERVER_URL", "not a url")]));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_server_base_url_gets_trailing_slash() {
        let mut config = KioskConfig::default();
        config.server_url = "http://10.0.0.5:3000/pos".into();
        assert_eq!(
            config.server_base_url().unwrap().join("api/orders").unwrap().as_str(),
            "http://10.0.0.5:3000/pos/api/orders"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = KioskConfig::default();
        config.server_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        let mut config = KioskConfig::default();
        config.tax_rate_bps = 20_000;
        assert!(config.validate().is_err());

        let mut config = KioskConfig::default();
        config.cart_key = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_file_round_trip() {
        let path = std::env::temp_dir().join(format!("kiosk-{}.toml", uuid::Uuid::new_v4()));
        let mut config = KioskConfig::default();
        config.store_name = "Boba Downtown".into();
        config.tax_rate_bps = 700;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: KioskConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: KioskConfig = toml::from_str("tax_rate_bps = 600").unwrap();
        assert_eq!(loaded.tax_rate_bps, 600);
        assert_eq!(loaded.cart_key, "cart");
    }
}
