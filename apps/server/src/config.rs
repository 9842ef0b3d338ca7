//! Order server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable             | Default    |
//! |----------------------|------------|
//! | `BOBA_PORT`          | `3000`     |
//! | `BOBA_DATABASE_PATH` | `boba.db`  |
//! | `BOBA_TAX_RATE`      | `8.25` (%) |
//! | `BOBA_BIND_ADDR`     | `0.0.0.0`  |

use boba_core::validation::validate_tax_rate_bps;
use boba_core::TaxRate;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,

    /// SQLite file, created and migrated on startup
    pub database_path: PathBuf,

    pub tax_rate: TaxRate,

    pub bind_addr: IpAddr,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let tax_pct: f64 = get("BOBA_TAX_RATE", "8.25")
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BOBA_TAX_RATE".to_string()))?;
        if !tax_pct.is_finite() || tax_pct < 0.0 {
            return Err(ConfigError::InvalidValue("BOBA_TAX_RATE".to_string()));
        }
        let tax_rate = TaxRate::from_percentage(tax_pct);
        validate_tax_rate_bps(tax_rate.bps())
            .map_err(|_| ConfigError::InvalidValue("BOBA_TAX_RATE".to_string()))?;

        Ok(ServerConfig {
            port: get("BOBA_PORT", "3000")
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BOBA_PORT".to_string()))?,

            database_path: PathBuf::from(get("BOBA_DATABASE_PATH", "boba.db")),

            tax_rate,

            bind_addr: get("BOBA_BIND_ADDR", "0.0.0.0")
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BOBA_BIND_ADDR".to_string()))?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
