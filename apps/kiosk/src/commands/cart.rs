//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Submitted│       │
//! │  │  Cart    │     │          │     │   Form   │     │  Order   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   add_to_cart                       submit_order        │
//! │                   update_cart_item                  (order.rs)          │
//! │                   remove_from_cart                       │              │
//! │                        │                                 ▼              │
//! │                   clear_cart ─────────────────────► (back to empty)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are addressed by [`LineRef`]; a ref taken before another line was
//! removed is rejected instead of editing the wrong drink.

use boba_core::{Customization, DrinkConfiguration, LineRef, MAX_ITEM_QUANTITY};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartSnapshot, CartStore, CatalogState};

/// Gets the current cart contents.
///
/// ```text
/// ┌────────────────────────────────────────────────────────────────┐
/// │  CART                                              2 drinks    │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Milk Tea (L, 100%)          x2              $8.80             │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Subtotal                                    $8.80             │
/// │  Tax (8.25%)                                 $0.73             │
/// │  TOTAL                                       $9.53             │
/// └────────────────────────────────────────────────────────────────┘
/// ```
pub async fn get_cart(cart: &CartStore) -> CartSnapshot {
    debug!("get_cart command");
    cart.snapshot().await
}

/// Adds a customized drink from the catalog.
///
/// ## Behavior
/// - Always appends a new line, even for an identical drink
/// - The price is taken from the catalog entry at the time of adding
/// - Quantity defaults to 1 and is clamped to the stepper's range
pub async fn add_to_cart(
    cart: &CartStore,
    catalog: &CatalogState,
    drink: &str,
    customization: Customization,
    quantity: Option<i64>,
) -> Result<CartSnapshot, ApiError> {
    let quantity = quantity.unwrap_or(1).clamp(1, MAX_ITEM_QUANTITY);
    debug!(drink = %drink, quantity, "add_to_cart command");

    let entry = catalog
        .entry(drink)
        .await?
        .ok_or_else(|| ApiError::not_found("Drink", drink))?;
    let config = DrinkConfiguration::from_catalog(&entry, customization)?;

    cart.add(config, quantity).await?;
    Ok(cart.snapshot().await)
}

/// Sets a line's quantity. Zero removes the line; anything above the
/// stepper's maximum is clamped.
pub async fn update_cart_item(
    cart: &CartStore,
    line: LineRef,
    quantity: i64,
) -> Result<CartSnapshot, ApiError> {
    debug!(index = line.index, generation = line.generation, quantity, "update_cart_item command");

    cart.set_quantity_at(line, quantity).await?;
    Ok(cart.snapshot().await)
}

pub async fn remove_from_cart(cart: &CartStore, line: LineRef) -> Result<CartSnapshot, ApiError> {
    debug!(index = line.index, generation = line.generation, "remove_from_cart command");

    cart.remove_at(line).await?;
    Ok(cart.snapshot().await)
}

pub async fn clear_cart(cart: &CartStore) -> Result<CartSnapshot, ApiError> {
    debug!("clear_cart command");

    cart.clear().await?;
    Ok(cart.snapshot().await)
}

/// Total drinks in the cart, for the header badge.
pub async fn cart_badge(cart: &CartStore) -> i64 {
    cart.totals().await.total_quantity
}

/// A reference to the line currently at `index`.
pub async fn line_ref(cart: &CartStore, index: usize) -> Result<LineRef, ApiError> {
    Ok(cart.line_ref(index).await?)
}
