//! # Validation Module
//!
//! Input validation for the kiosk commands and the order server.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Kiosk frontend (popup, quantity stepper)                     │
//! │  └── Only offers valid choices; clamps the stepper                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Kiosk commands / server handlers (Rust)                      │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: names, emails, quantities, prices                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / foreign key constraints                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest display name accepted for a customer or employee.
pub const MAX_NAME_LEN: usize = 80;

/// Longest label on a saved favorite.
pub const MAX_LABEL_LEN: usize = 60;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer or employee display name and returns it trimmed.
///
/// ```rust
/// use boba_core::validation::validate_display_name;
///
/// assert_eq!(validate_display_name("customer_name", "  Ana ").unwrap(), "Ana");
/// assert!(validate_display_name("customer_name", "   ").is_err());
/// ```
pub fn validate_display_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::required(field));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

/// Validates an optional favorite label. Blank labels become `None`.
pub fn validate_label(label: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: "label".to_string(),
            max: MAX_LABEL_LEN,
        });
    }
    Ok(Some(label.to_string()))
}

/// Checks that an address is plausible enough to queue a receipt for.
///
/// ## Rules
/// - One `@`, with something before it
/// - A dot in the domain, not at either end
/// - No whitespace
///
/// ```rust
/// use boba_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana@localhost").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::required("receipt_email"));
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "receipt_email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing @"))?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must have exactly one @ after a name"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }
    Ok(email.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order-line quantity (1..=999).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Prices may be zero, never negative.
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates the number of lines in an order.
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "orders".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}
