//! # API Error Type
//!
//! Unified error type for kiosk commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frontend                    Kiosk commands                             │
//! │  ────────                    ──────────────                             │
//! │                                                                         │
//! │  submit_order(...)                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function → Result<T, ApiError>                          │  │
//! │  │                                                                  │  │
//! │  │  CoreError     (empty cart, stale line, unsupported option) ──┐  │  │
//! │  │  CartError     (core rule or storage write failure)         ──┤  │  │
//! │  │  RemoteError   (server unreachable, 4xx/5xx)                ──┼─►│  │
//! │  │  ConfigError   (bad kiosk.toml / env override)              ──┘  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "STALE_REFERENCE", "message": "Cart line reference ..." }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use boba_core::{CoreError, ValidationError};
use boba_db::DbError;
use serde::Serialize;
use tracing::error;

use crate::remote::RemoteError;
use crate::state::{CartError, ConfigError, StorageError};

/// What the frontend receives when a command fails.
///
/// ```json
/// { "code": "OUT_OF_STOCK", "message": "Mango Smoothie is out of stock" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,

    /// Input validation failed; the operator can correct it
    ValidationError,

    /// Local durable storage could not be read or written
    StorageError,

    /// A catalog rule rejected the request (hot on a cold-only drink, ...)
    BusinessLogic,

    /// Cart operation failed (too many lines, missing line)
    CartError,

    OutOfStock,

    /// The view acted on a line reference taken before positions shifted
    StaleReference,

    /// The drink is already saved as a favorite
    Duplicate,

    /// The order server rejected the request or could not be reached
    RemoteError,

    ConfigError,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::DrinkNotFound(name) => ApiError::not_found("Drink", &name),
            CoreError::OutOfStock { .. } | CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::OutOfStock, message)
            }
            CoreError::UnsupportedOption { .. } | CoreError::InvalidLine { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            CoreError::LineNotFound { .. } | CoreError::CartTooLarge { .. } => {
                ApiError::new(ErrorCode::CartError, message)
            }
            CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, message),
            CoreError::StaleLineReference { .. } => {
                ApiError::new(ErrorCode::StaleReference, message)
            }
            CoreError::DuplicateFavorite { .. } => ApiError::new(ErrorCode::Duplicate, message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Serialization(e) => {
                error!("Cart serialization failed: {}", e);
                ApiError::internal("Cart could not be encoded")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other => {
                error!("Local database error: {}", other);
                ApiError::new(ErrorCode::StorageError, "Local storage operation failed")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        error!("Storage error: {}", err);
        ApiError::new(ErrorCode::StorageError, err.to_string())
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Core(e) => e.into(),
            CartError::Storage(e) => e.into(),
        }
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(message) => ApiError::new(ErrorCode::NotFound, message),
            RemoteError::Conflict(message) => ApiError::new(ErrorCode::Duplicate, message),
            RemoteError::Rejected { message, .. } => {
                ApiError::new(ErrorCode::ValidationError, message)
            }
            other => {
                error!("Order server request failed: {}", other);
                ApiError::new(ErrorCode::RemoteError, other.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: ApiError = CoreError::StaleLineReference { held: 1, current: 2 }.into();
        assert_eq!(err.code, ErrorCode::StaleReference);

        let err: ApiError = CoreError::OutOfStock {
            name: "Mango Smoothie".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::OutOfStock);
        assert_eq!(err.message, "Mango Smoothie is out of stock");

        let err: ApiError = CoreError::InsufficientStock {
            name: "Mango Smoothie".into(),
            requested: 3,
            remaining: 1,
        }
        .into();
        assert_eq!(err.code, ErrorCode::OutOfStock);
        assert_eq!(err.message, "Only 1 Mango Smoothie left, 3 ordered");

        let err: ApiError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::validation("customer_name is required");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "customer_name is required");
    }

    #[test]
    fn test_remote_conflict_is_duplicate() {
        let err: ApiError = RemoteError::Conflict("already saved".into()).into();
        assert_eq!(err.code, ErrorCode::Duplicate);
    }
}
