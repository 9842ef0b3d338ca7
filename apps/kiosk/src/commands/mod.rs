//! # Kiosk Commands
//!
//! Everything the frontend invokes, as plain async functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── cart.rs       ◄─── Cart manipulation, badge
//! ├── catalog.rs    ◄─── Menu, price quotes, toppings
//! ├── order.rs      ◄─── Order submission
//! ├── favorites.rs  ◄─── Save / list / delete / reorder favorites
//! └── config.rs     ◄─── Configuration retrieval
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! async fn get_cart(cart: &CartStore) -> CartSnapshot
//!
//! // Needs the catalog and the cart
//! async fn add_to_cart(cart: &CartStore, catalog: &CatalogState, ...)
//!
//! // Needs a remote collaborator
//! async fn submit_order(cart: &CartStore, sink: &dyn OrderSink, ...)
//! ```
//!
//! All commands return `Result<T, ApiError>` so the frontend receives
//! `{ code, message }` on failure.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod order;

pub use cart::*;
pub use catalog::*;
pub use config::*;
pub use favorites::*;
pub use order::*;
