//! # Order Wire Schema
//!
//! The order-placement request the kiosk sends and the receipt the server
//! answers with, plus the checks both sides run on them.
//!
//! ## Request Shape
//! ```text
//! {
//!   "orders": [ { catalogId, name, size, iceLevel, sweetness, temperature,
//!                 teaType, toppings[], basePrice, toppingsCost,
//!                 quantity, unitPrice, lineTotal }, ... ],
//!   "employee_name": "Sam",            ─┐
//!   "customer_name": "Ana",             │ OrderMetadata
//!   "payment_method": "card",           │
//!   "want_receipt": true,               │
//!   "receipt_email": "ana@boba.shop"   ─┘
//! }
//! ```
//!
//! Lines travel already priced. The server never trusts them: every line is
//! re-checked against the catalog and against its own components, then
//! repriced from the catalog before it is stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::cart::{Cart, CartLineItem};
use crate::catalog::{Catalog, CatalogEntry};
use crate::drink::{DrinkConfiguration, Toppings};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    deserialize_tea_type, IceLevel, PaymentMethod, Size, Sweetness, TeaType, Temperature,
};
use crate::validation::{
    validate_cart_size, validate_display_name, validate_email, validate_price_cents,
    validate_quantity,
};

// =============================================================================
// Order Entry
// =============================================================================

fn one() -> i64 {
    1
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    #[serde(default)]
    pub catalog_id: String,
    pub name: String,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub ice_level: IceLevel,
    #[serde(default)]
    pub sweetness: Sweetness,
    #[serde(default)]
    pub temperature: Temperature,
    #[serde(default, deserialize_with = "deserialize_tea_type")]
    pub tea_type: Option<TeaType>,
    #[serde(default)]
    pub toppings: Toppings,
    #[serde(default, with = "crate::money::dollars")]
    pub base_price: Money,
    #[serde(default, with = "crate::money::dollars")]
    pub toppings_cost: Money,
    #[serde(default = "one")]
    pub quantity: i64,
    #[serde(default, with = "crate::money::dollars")]
    pub unit_price: Money,
    #[serde(default, with = "crate::money::dollars")]
    pub line_total: Money,
}

impl From<&CartLineItem> for OrderEntry {
    fn from(line: &CartLineItem) -> Self {
        let config = line.config();
        OrderEntry {
            catalog_id: config.catalog_id.clone(),
            name: config.name.clone(),
            size: config.size,
            ice_level: config.ice_level,
            sweetness: config.sweetness,
            temperature: config.temperature,
            tea_type: config.tea_type,
            toppings: config.toppings.clone(),
            base_price: config.base_price,
            toppings_cost: line.toppings_cost(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
            line_total: line.line_total(),
        }
    }
}

impl OrderEntry {
    pub fn config(&self) -> DrinkConfiguration {
        let mut config = DrinkConfiguration {
            catalog_id: self.catalog_id.clone(),
            name: self.name.clone(),
            base_price: self.base_price,
            size: self.size,
            ice_level: self.ice_level,
            sweetness: self.sweetness,
            temperature: self.temperature,
            tea_type: self.tea_type,
            toppings: self.toppings.clone(),
        };
        config.normalize();
        config
    }

    /// Checks the line's own arithmetic. `line` is 1-based, for messages.
    pub fn validate_pricing(&self, line: usize) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::invalid_line(line, "drink name is required"));
        }
        validate_quantity(self.quantity)
            .map_err(|e| CoreError::invalid_line(line, e.to_string()))?;
        for (field, amount) in [
            ("basePrice", self.base_price),
            ("toppingsCost", self.toppings_cost),
            ("unitPrice", self.unit_price),
            ("lineTotal", self.line_total),
        ] {
            validate_price_cents(field, amount.cents())
                .map_err(|e| CoreError::invalid_line(line, e.to_string()))?;
        }

        let components = self.base_price
            + self.size.surcharge()
            + self.sweetness.surcharge()
            + self.toppings_cost;
        if components != self.unit_price {
            return Err(CoreError::invalid_line(
                line,
                format!(
                    "unitPrice {} does not match its components {}",
                    self.unit_price, components
                ),
            ));
        }
        let expected = self.unit_price.multiply_quantity(self.quantity);
        if expected != self.line_total {
            return Err(CoreError::invalid_line(
                line,
                format!("lineTotal {} should be {}", self.line_total, expected),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Who placed the order and how it was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderMetadata {
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub want_receipt: bool,
    #[serde(default)]
    pub receipt_email: Option<String>,
}

impl OrderMetadata {
    pub fn new(payment_method: PaymentMethod) -> Self {
        OrderMetadata {
            employee_name: None,
            customer_name: None,
            payment_method,
            want_receipt: false,
            receipt_email: None,
        }
    }

    /// Validates and trims the metadata.
    ///
    /// ## Rules
    /// - At least one of customer or employee name
    /// - A plausible email when a receipt is wanted
    pub fn validated(&self) -> Result<OrderMetadata, ValidationError> {
        let name = |field: &str, value: &Option<String>| -> Result<Option<String>, ValidationError> {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(v) => validate_display_name(field, v).map(Some),
                None => Ok(None),
            }
        };
        let employee_name = name("employee_name", &self.employee_name)?;
        let customer_name = name("customer_name", &self.customer_name)?;
        if employee_name.is_none() && customer_name.is_none() {
            return Err(ValidationError::required("customer_name"));
        }

        let receipt_email = if self.want_receipt {
            Some(validate_email(self.receipt_email.as_deref().unwrap_or(""))?)
        } else {
            None
        };

        Ok(OrderMetadata {
            employee_name,
            customer_name,
            payment_method: self.payment_method,
            want_receipt: self.want_receipt,
            receipt_email,
        })
    }
}

// =============================================================================
// Request
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
    #[serde(flatten)]
    pub metadata: OrderMetadata,
}

impl OrderRequest {
    /// Serializes a cart for submission.
    ///
    /// ## Errors
    /// - `EmptyCart` for an empty cart
    /// - `Validation` for missing names or a bad receipt address
    pub fn from_cart(cart: &Cart, metadata: OrderMetadata) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let metadata = metadata.validated()?;
        Ok(OrderRequest {
            orders: cart.lines().iter().map(OrderEntry::from).collect(),
            metadata,
        })
    }

    pub fn subtotal(&self) -> Money {
        self.orders.iter().map(|entry| entry.line_total).sum()
    }

    /// Everything the server checks before accepting an order.
    ///
    /// ## Rules
    /// - Each line's arithmetic adds up (components, `unitPrice × quantity`)
    /// - Known drink, known toppings, options the drink offers
    /// - Tracked stock covers the quantity summed over all lines of a drink
    pub fn validate_against_catalog(&self, catalog: &Catalog) -> CoreResult<()> {
        if self.orders.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_cart_size(self.orders.len())?;
        self.metadata.validated()?;

        let mut ordered: BTreeMap<&str, (&CatalogEntry, i64)> = BTreeMap::new();
        for (i, entry) in self.orders.iter().enumerate() {
            let line = i + 1;
            entry.validate_pricing(line)?;
            let config = entry.config();
            if let Some(unknown) = config.toppings.first_unknown() {
                return Err(CoreError::unsupported(&config.name, unknown));
            }
            let drink = catalog.check(&config)?;
            ordered
                .entry(drink.catalog_id.as_str())
                .or_insert((drink, 0))
                .1 += entry.quantity;
        }

        for (drink, requested) in ordered.into_values() {
            if let Some(remaining) = drink.qty_remaining.filter(|&left| requested > left) {
                return Err(CoreError::InsufficientStock {
                    name: drink.name.clone(),
                    requested,
                    remaining,
                });
            }
        }
        Ok(())
    }

    /// Validates, then reprices every line from the catalog.
    ///
    /// The kiosk's prices only have to add up; the amounts charged come from
    /// the catalog's base price plus the surcharges. Metadata comes back
    /// trimmed.
    pub fn priced_from_catalog(&self, catalog: &Catalog) -> CoreResult<OrderRequest> {
        self.validate_against_catalog(catalog)?;

        let mut orders = Vec::with_capacity(self.orders.len());
        for entry in &self.orders {
            let mut config = entry.config();
            let drink = catalog.check(&config)?;
            config.catalog_id = drink.catalog_id.clone();
            config.name = drink.name.clone();
            config.base_price = drink.base_price;
            orders.push(OrderEntry::from(&CartLineItem::new(config, entry.quantity)));
        }

        Ok(OrderRequest {
            orders,
            metadata: self.metadata.validated()?,
        })
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// What the server answers for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderReceipt {
    pub ok: bool,
    pub order_id: String,
    pub line_count: usize,
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub subtotal: Money,
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub tax: Money,
    #[serde(with = "crate::money::dollars")]
    #[ts(type = "number")]
    pub total: Money,
    pub receipt_queued: bool,
}
