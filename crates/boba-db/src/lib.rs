//! # boba-db: Database Layer for Boba POS
//!
//! SQLite access for the order-acceptance server (menu, orders, favorites)
//! and for the kiosk's durable local storage (documents).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apps/server handlers          apps/kiosk SqliteDocumentStore          │
//! │       │                                    │                            │
//! │       ▼                                    ▼                            │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     boba-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ DrinkRepository    │  │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ OrderRepository    │  │ 001..003   │  │   │
//! │  │   │               │    │ FavoriteRepository │  │            │  │   │
//! │  │   │               │    │ DocumentRepository │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (boba.db on the server, kiosk.db on a kiosk)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boba_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("boba.db")).await?;
//! let menu = db.drinks().list_menu().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::document::DocumentRepository;
pub use repository::drink::{DrinkRepository, NewDrink};
pub use repository::favorite::FavoriteRepository;
pub use repository::order::{OrderRepository, StoredOrder, StoredOrderLine};
