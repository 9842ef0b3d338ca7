//! # State Module
//!
//! Long-lived kiosk state, injected into commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐  ┌──────────────────────┐  ┌──────────────────┐  │
//! │  │   CartStore      │  │   DocumentStore      │  │   KioskConfig    │  │
//! │  │                  │  │                      │  │                  │  │
//! │  │  Mutex<Cart>     │─►│  memory / SQLite     │  │  server URL      │  │
//! │  │  CartEvent tx    │  │  StorageEvent tx     │  │  tax rate        │  │
//! │  └──────────────────┘  └──────────────────────┘  └──────────────────┘  │
//! │                                                                         │
//! │  • CartStore: one writer at a time, persist-then-commit                │
//! │  • DocumentStore: shared by every view on this kiosk                   │
//! │  • KioskConfig: read-only after startup                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;
mod storage;

pub use cart::{CartError, CartEvent, CartResult, CartSnapshot, CartStore};
pub use catalog::CatalogState;
pub use config::{ConfigError, ConfigResult, KioskConfig};
pub use storage::{
    DocumentStore, MemoryDocumentStore, MockDocumentStore, SqliteDocumentStore, StorageError,
    StorageEvent, StorageResult, ViewId,
};
