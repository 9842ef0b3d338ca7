//! # Repository Module
//!
//! One repository per table group, each holding a clone of the pool.
//!
//! ```text
//! db.drinks()     DrinkRepository     menu rows, catalog, stock
//! db.orders()     OrderRepository     orders + order_lines (one transaction)
//! db.favorites()  FavoriteRepository  saved favorites per customer
//! db.documents()  DocumentRepository  key → JSON body (kiosk storage)
//! ```
//!
//! Option enums are stored as their canonical labels (`"50%"`, `"less"`)
//! and read back through the same lenient parsers the JSON wire uses.

pub mod document;
pub mod drink;
pub mod favorite;
pub mod order;
