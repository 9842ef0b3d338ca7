//! # Boba Kiosk Library
//!
//! The kiosk side of Boba POS: the persisted cart, the commands the
//! frontend invokes, and the clients that talk to the order server.
//!
//! ## Module Organization
//! ```text
//! boba_kiosk/
//! ├── lib.rs          ◄─── You are here (startup, wiring, logging)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── storage.rs  ◄─── Durable document store (memory / SQLite)
//! │   ├── cart.rs     ◄─── CartStore: write-through cart, change events
//! │   ├── catalog.rs  ◄─── Cached menu
//! │   └── config.rs   ◄─── KioskConfig (toml + env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── catalog.rs  ◄─── Menu, quotes, toppings
//! │   ├── order.rs    ◄─── Order submission
//! │   ├── favorites.rs◄─── Favorites and reorder
//! │   └── config.rs   ◄─── Configuration retrieval
//! ├── remote.rs       ◄─── OrderSink / CatalogSource / FavoritesStore + HTTP
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │    CartStore     │ │   CatalogState   │ │    KioskConfig       │   │
//! │  │                  │ │                  │ │                      │   │
//! │  │  • Current cart  │ │  • Menu cache    │ │  • Server URL        │   │
//! │  │  • Write-through │ │  • Lazy fetch    │ │  • Tax rate          │   │
//! │  │  • Change events │ │                  │ │  • Duplicate policy  │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  Each command takes only the state it needs.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod remote;
pub mod state;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::ApiError;
use remote::{CatalogSource, FavoritesStore, HttpClient, OrderSink};
use state::{
    CartStore, CatalogState, DocumentStore, KioskConfig, MemoryDocumentStore,
    SqliteDocumentStore,
};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,boba=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=boba_kiosk=trace` - Trace for the kiosk crate only
/// - Default: `info,boba=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A running kiosk: its state and collaborators, wired together.
pub struct Kiosk {
    config: KioskConfig,
    storage: Arc<dyn DocumentStore>,
    cart: Arc<CartStore>,
    catalog: CatalogState,
    orders: Arc<dyn OrderSink>,
    favorites: Arc<dyn FavoritesStore>,
    watcher: JoinHandle<()>,
}

impl std::fmt::Debug for Kiosk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kiosk")
            .field("config", &self.config)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Kiosk {
    /// Starts a kiosk from configuration.
    ///
    /// ## Startup Sequence
    /// ```text
    /// 1. Validate config (URL, tax rate, cart key, timeout)
    /// 2. Open storage: SQLite at storage_path, or memory when unset
    /// 3. Load the cart, normalizing any historic shape
    /// 4. Watch storage for writes from other views
    /// 5. Build the HTTP client for the order server
    /// ```
    pub async fn start(config: KioskConfig) -> Result<Kiosk, ApiError> {
        config.validate()?;

        let storage: Arc<dyn DocumentStore> = match &config.storage_path {
            Some(path) => {
                info!(path = %path.display(), "Opening cart storage");
                Arc::new(SqliteDocumentStore::open(path.clone()).await?)
            }
            None => {
                info!("No storage path configured, cart is kept in memory");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        let client = Arc::new(
            HttpClient::new(config.server_base_url()?, config.request_timeout())?,
        );

        Kiosk::with_parts(config, storage, client.clone(), client.clone(), client).await
    }

    /// Wires a kiosk from explicit parts.
    pub async fn with_parts(
        config: KioskConfig,
        storage: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CatalogSource>,
        orders: Arc<dyn OrderSink>,
        favorites: Arc<dyn FavoritesStore>,
    ) -> Result<Kiosk, ApiError> {
        let cart = Arc::new(
            CartStore::open(storage.clone(), config.cart_key.clone(), config.tax_rate()).await?,
        );
        let watcher = cart.watch();

        info!(store = %config.store_name, server = %config.server_url, "Kiosk started");

        Ok(Kiosk {
            config,
            storage,
            cart,
            catalog: CatalogState::new(catalog),
            orders,
            favorites,
            watcher,
        })
    }

    /// Opens another view of the same cart, as a second window would.
    pub async fn open_view(&self) -> Result<Arc<CartStore>, ApiError> {
        let view = Arc::new(
            CartStore::open(
                self.storage.clone(),
                self.config.cart_key.clone(),
                self.config.tax_rate(),
            )
            .await?,
        );
        // Exits on the first storage event after the view is dropped.
        let _ = view.watch();
        Ok(view)
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn orders(&self) -> &dyn OrderSink {
        self.orders.as_ref()
    }

    pub fn favorites(&self) -> &dyn FavoritesStore {
        self.favorites.as_ref()
    }
}

impl Drop for Kiosk {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}
