//! # Error Types
//!
//! Domain-specific error types for boba-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  boba-core errors (this file)                                          │
//! │  ├── CoreError        - Cart, catalog and order rule violations        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  boba-db errors                                                        │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  kiosk / server errors                                                 │
//! │  ├── ApiError         - What the kiosk frontend sees (serialized)      │
//! │  └── ServerError      - HTTP status + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError / ServerError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed persisted cart entries are not errors: they are normalized or
//! dropped by [`crate::legacy`] and never reach this enum.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The drink is not in the catalog.
    #[error("Drink not found: {0}")]
    DrinkNotFound(String),

    /// The drink has no remaining stock.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// An order asks for more of a tracked drink than is left.
    #[error("Only {remaining} {name} left, {requested} ordered")]
    InsufficientStock {
        name: String,
        requested: i64,
        remaining: i64,
    },

    /// A customization the catalog entry does not offer.
    ///
    /// ## When This Occurs
    /// ```text
    /// Catalog: Mango Smoothie { supportsHot: false }
    ///      │
    ///      ▼
    /// Customization { temperature: hot }
    ///      │
    ///      ▼
    /// UnsupportedOption { drink: "Mango Smoothie", option: "hot" }
    /// ```
    #[error("{drink} does not support {option}")]
    UnsupportedOption { drink: String, option: String },

    /// Index-based cart operation on a position that does not exist.
    #[error("Cart line {index} does not exist (cart has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    /// A line reference taken before the cart's positions shifted.
    ///
    /// ## When This Occurs
    /// - A pending edit keyed by index after another line was removed
    /// - A view acting on a snapshot that was reloaded from storage
    #[error("Cart line reference is stale (taken at generation {held}, cart is at {current})")]
    StaleLineReference { held: u64, current: u64 },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Submission attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// An order line failed server-side re-validation.
    #[error("Order line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    /// The favorite already exists for this customer.
    #[error("{name} is already a favorite")]
    DuplicateFavorite { name: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A document could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates an UnsupportedOption error.
    pub fn unsupported(drink: impl Into<String>, option: impl Into<String>) -> Self {
        CoreError::UnsupportedOption {
            drink: drink.into(),
            option: option.into(),
        }
    }

    /// Creates an InvalidLine error.
    pub fn invalid_line(line: usize, reason: impl Into<String>) -> Self {
        CoreError::InvalidLine {
            line,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. an email address without a domain).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::unsupported("Mango Smoothie", "hot");
        assert_eq!(err.to_string(), "Mango Smoothie does not support hot");

        let err = CoreError::StaleLineReference { held: 2, current: 3 };
        assert_eq!(
            err.to_string(),
            "Cart line reference is stale (taken at generation 2, cart is at 3)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("customer_name").to_string(),
            "customer_name is required"
        );

        let err = ValidationError::TooLong {
            field: "label".to_string(),
            max: 60,
        };
        assert_eq!(err.to_string(), "label must be at most 60 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
