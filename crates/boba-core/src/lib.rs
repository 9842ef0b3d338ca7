//! # boba-core: Pure Business Logic for Boba POS
//!
//! Everything that decides what a drink costs and what a cart contains lives
//! here, as pure functions over plain data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Boba POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Kiosk / Cashier frontend (menu, popup, cart)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  apps/kiosk: CartStore, submit_order, save_favorite, ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ boba-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌────────┐ ┌────────┐ ┌───────────┐   │   │
//! │  │  │ pricing │ │  drink  │ │ legacy │ │  cart  │ │ favorites │   │   │
//! │  │  └─────────┘ └─────────┘ └────────┘ └────────┘ └───────────┘   │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌────────┐ ┌────────────┐             │   │
//! │  │  │  money  │ │  types  │ │ order  │ │  catalog   │             │   │
//! │  │  └─────────┘ └─────────┘ └────────┘ └────────────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │  boba-db (SQLite) / apps/server (order acceptance, axum)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent money, dollar wire format
//! - [`types`] - Option enums (size, ice, sweetness, ...) and tax rate
//! - [`drink`] - The drink configuration value object
//! - [`pricing`] - Unit price and breakdown for a configuration
//! - [`legacy`] - Normalization of historically persisted cart entries
//! - [`cart`] - Ordered cart lines, quantities and totals
//! - [`favorites`] - Duplicate detection against saved favorites
//! - [`catalog`] - Flattened catalog lookup and capability checks
//! - [`order`] - Order-placement request/receipt schemas
//! - [`validation`] - Input validation helpers
//!
//! ## Example Usage
//!
//! ```rust
//! use boba_core::{Cart, DrinkConfiguration, Money, Size, TaxRate};
//!
//! let mut config = DrinkConfiguration::new("Milk Tea", Money::from_cents(400));
//! config.size = Size::Large;
//!
//! let mut cart = Cart::new();
//! cart.add(config, 2).unwrap();
//!
//! let totals = cart.totals(TaxRate::from_bps(825));
//! assert_eq!(totals.subtotal.to_string(), "$8.80");
//! assert_eq!(totals.total.to_string(), "$9.53");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod drink;
pub mod error;
pub mod favorites;
pub mod legacy;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CartTotals, LineRef};
pub use catalog::{Catalog, CatalogEntry};
pub use drink::{Customization, DrinkConfiguration, Toppings};
pub use error::{CoreError, CoreResult, ValidationError};
pub use favorites::{
    is_duplicate, DuplicatePolicy, FavoriteRecord, FavoriteSaved, FavoritesResponse, NewFavorite,
};
pub use money::Money;
pub use order::{OrderEntry, OrderMetadata, OrderReceipt, OrderRequest};
pub use pricing::{price, PriceBreakdown, PriceQuote};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax applied to every order, in basis points (8.25%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 825;

/// Maximum lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// The quantity stepper clamps to this value instead of failing.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default storage key for the persisted cart document.
pub const CART_STORAGE_KEY: &str = "cart";
