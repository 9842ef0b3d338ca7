//! # Cart Store
//!
//! The kiosk's one cart: in memory for the view, written through to durable
//! storage on every mutation, reloaded when another view writes it.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add / set_quantity / remove / clear                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  lock cart (tokio Mutex, held across the write)                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  apply to a COPY ──► save copy to storage ──► ok? ──► commit copy      │
//! │                                    │                    │               │
//! │                                    ▼                    ▼               │
//! │                               error: memory      CartEvent::Changed    │
//! │                               untouched                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes from one view are strictly ordered by the lock. Across views the
//! last write wins; [`CartStore::watch`] reloads on foreign writes.

use boba_core::{Cart, CartLineItem, CartTotals, CoreError, CoreResult, DrinkConfiguration, LineRef, TaxRate};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::storage::{DocumentStore, StorageError, ViewId};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type CartResult<T> = Result<T, CartError>;

/// Lines and totals as the frontend renders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    /// Line refs taken at another generation are stale.
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// This view changed the cart.
    Changed(CartSnapshot),
    /// Another view wrote the cart and this one reloaded it.
    Reloaded(CartSnapshot),
}

pub struct CartStore {
    storage: Arc<dyn DocumentStore>,
    key: String,
    tax_rate: TaxRate,
    view: ViewId,
    cart: Mutex<Cart>,
    events: broadcast::Sender<CartEvent>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("tax_rate", &self.tax_rate)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

/// Reads and normalizes the stored cart, writing back non-canonical shapes.
async fn load_cart(storage: &dyn DocumentStore, key: &str, view: ViewId) -> CartResult<Cart> {
    let document = storage.load(key).await?.unwrap_or(Value::Null);
    let (cart, report) = Cart::from_document(&document);

    if report.malformed || report.dropped > 0 {
        warn!(
            key,
            stored = report.stored,
            dropped = report.dropped,
            malformed = report.malformed,
            "Dropped unreadable cart entries"
        );
    }

    if report.needs_rewrite() {
        debug!(key, rewritten = report.rewritten, "Writing normalized cart back");
        if let Err(e) = storage.save(key, &cart.to_document()?, view).await {
            // The normalized cart prices the same as the stored one.
            warn!(key, error = %e, "Could not write back normalized cart");
        }
    }

    Ok(cart)
}

impl CartStore {
    /// Loads the cart stored under `key`.
    pub async fn open(
        storage: Arc<dyn DocumentStore>,
        key: impl Into<String>,
        tax_rate: TaxRate,
    ) -> CartResult<Self> {
        let key = key.into();
        let view = ViewId::next();
        let cart = load_cart(storage.as_ref(), &key, view).await?;

        info!(key = %key, lines = cart.len(), "Cart loaded");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(CartStore {
            storage,
            key,
            tax_rate,
            view,
            cart: Mutex::new(cart),
            events,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    fn snapshot_of(&self, cart: &Cart) -> CartSnapshot {
        CartSnapshot {
            items: cart.lines().to_vec(),
            totals: cart.totals(self.tax_rate),
            generation: cart.generation(),
        }
    }

    pub async fn snapshot(&self) -> CartSnapshot {
        let cart = self.cart.lock().await;
        self.snapshot_of(&cart)
    }

    /// A copy of the current cart.
    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn totals(&self) -> CartTotals {
        self.cart.lock().await.totals(self.tax_rate)
    }

    pub async fn line_ref(&self, index: usize) -> CartResult<LineRef> {
        Ok(self.cart.lock().await.line_ref(index)?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies `f` to a copy, persists the copy, then commits it.
    async fn mutate<T>(&self, f: impl FnOnce(&mut Cart) -> CoreResult<T>) -> CartResult<T> {
        let mut cart = self.cart.lock().await;

        let mut next = cart.clone();
        let out = f(&mut next)?;

        self.storage
            .save(&self.key, &next.to_document()?, self.view)
            .await?;

        *cart = next;
        let _ = self.events.send(CartEvent::Changed(self.snapshot_of(&cart)));
        Ok(out)
    }

    /// Appends a line. Identical drinks become separate lines.
    pub async fn add(&self, config: DrinkConfiguration, quantity: i64) -> CartResult<LineRef> {
        debug!(drink = %config.name, quantity, "Adding to cart");
        self.mutate(|cart| cart.add(config, quantity)).await
    }

    /// Appends several lines at quantity one, all or none.
    pub async fn add_all(&self, configs: Vec<DrinkConfiguration>) -> CartResult<Vec<LineRef>> {
        self.mutate(|cart| {
            configs
                .into_iter()
                .map(|config| cart.add(config, 1))
                .collect::<CoreResult<Vec<_>>>()
        })
        .await
    }

    /// Quantity 0 removes the line; anything else is clamped to 1..=999.
    pub async fn set_quantity(&self, index: usize, quantity: i64) -> CartResult<()> {
        self.mutate(|cart| cart.set_quantity(index, quantity)).await
    }

    pub async fn set_quantity_at(&self, line: LineRef, quantity: i64) -> CartResult<()> {
        self.mutate(|cart| cart.set_quantity_at(line, quantity)).await
    }

    pub async fn remove(&self, index: usize) -> CartResult<CartLineItem> {
        self.mutate(|cart| cart.remove(index)).await
    }

    pub async fn remove_at(&self, line: LineRef) -> CartResult<CartLineItem> {
        self.mutate(|cart| cart.remove_at(line)).await
    }

    pub async fn clear(&self) -> CartResult<()> {
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
        .await
    }

    /// Clears the cart only if its lines still equal `expected`'s, so lines
    /// added while an order was in flight survive. A reload that only bumped
    /// the generation still clears. Returns whether it cleared.
    pub async fn clear_if_unchanged(&self, expected: &Cart) -> CartResult<bool> {
        {
            let cart = self.cart.lock().await;
            if cart.lines() != expected.lines() {
                return Ok(false);
            }
        }
        self.mutate(|cart| {
            if cart.lines() != expected.lines() {
                return Ok(false);
            }
            cart.clear();
            Ok(true)
        })
        .await
    }

    // =========================================================================
    // Cross-View Sync
    // =========================================================================

    /// Replaces the in-memory cart with the stored one. Outstanding line
    /// refs become stale.
    pub async fn sync_from_storage(&self) -> CartResult<CartSnapshot> {
        let mut cart = self.cart.lock().await;
        let stored = load_cart(self.storage.as_ref(), &self.key, self.view).await?;
        cart.replace_lines(stored.lines().to_vec());

        let snapshot = self.snapshot_of(&cart);
        debug!(key = %self.key, lines = cart.len(), "Cart reloaded from storage");
        let _ = self.events.send(CartEvent::Reloaded(snapshot.clone()));
        Ok(snapshot)
    }

    /// Reloads whenever another view writes this store's key. The task ends
    /// when the store is dropped or the storage channel closes.
    pub fn watch(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        let key = self.key.clone();
        let view = self.view;
        let mut events = self.storage.subscribe();

        tokio::spawn(async move {
            loop {
                let reload = match events.recv().await {
                    Ok(event) => event.key == key && event.origin != view,
                    Err(RecvError::Lagged(missed)) => {
                        debug!(missed, "Storage events lagged, reloading");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
                if !reload {
                    continue;
                }
                let Some(live) = store.upgrade() else { break };
                if let Err(e) = live.sync_from_storage().await {
                    warn!(key = %key, error = %e, "Cart reload failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::{MemoryDocumentStore, MockDocumentStore};
    use boba_core::{Money, Size};
    use serde_json::json;
    use std::time::Duration;

    const RATE: TaxRate = TaxRate::from_bps(825);

    fn milk_tea() -> DrinkConfiguration {
        let mut config = DrinkConfiguration::new("Milk Tea", Money::from_cents(400));
        config.size = Size::Large;
        config
    }

    async fn open(storage: &MemoryDocumentStore) -> CartStore {
        CartStore::open(Arc::new(storage.clone()), "cart", RATE)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_writes_through() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;

        store.add(milk_tea(), 2).await.unwrap();

        let totals = store.totals().await;
        assert_eq!(totals.total.cents(), 953);

        let stored = storage.load("cart").await.unwrap().unwrap();
        assert_eq!(stored[0]["lineTotal"], json!(8.8));
        assert_eq!(stored[0]["quantity"], json!(2));
    }

    #[tokio::test]
    async fn test_legacy_document_is_rewritten_on_open() {
        let storage = MemoryDocumentStore::with_document(
            "cart",
            json!([{"name": "Taro", "lineTotal": 2.75}, "garbage"]),
        );
        let store = open(&storage).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].line_total().cents(), 275);

        let stored = storage.load("cart").await.unwrap().unwrap();
        assert_eq!(stored.as_array().unwrap().len(), 1);
        assert_eq!(stored[0]["unitPrice"], json!(2.75));

        let reopened = open(&storage).await;
        assert_eq!(reopened.snapshot().await.items, snapshot.items);
    }

    #[tokio::test]
    async fn test_stale_stored_total_is_rewritten_on_open() {
        let storage = MemoryDocumentStore::with_document(
            "cart",
            json!([{"name": "Milk Tea", "basePrice": 4.0, "unitPrice": 4.0,
                    "toppingsCost": 0, "quantity": 2, "lineTotal": 99.0}]),
        );
        let store = open(&storage).await;
        assert_eq!(store.totals().await.subtotal.cents(), 800);

        let stored = storage.load("cart").await.unwrap().unwrap();
        assert_eq!(stored[0]["lineTotal"], json!(8.0));
    }

    #[tokio::test]
    async fn test_normalized_document_is_not_rewritten() {
        let mut cart = Cart::new();
        cart.add(milk_tea(), 2).unwrap();
        let document = cart.to_document().unwrap();

        let mut storage = MockDocumentStore::new();
        storage
            .expect_load()
            .returning(move |_| Ok(Some(document.clone())));
        storage.expect_save().never();

        let store = CartStore::open(Arc::new(storage), "cart", RATE)
            .await
            .unwrap();
        assert_eq!(store.cart().await.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_cart_unchanged() {
        let mut storage = MockDocumentStore::new();
        storage.expect_load().returning(|_| Ok(None));
        storage
            .expect_save()
            .returning(|_, _, _| Err(StorageError::WriteFailed("quota exceeded".into())));

        let store = CartStore::open(Arc::new(storage), "cart", RATE)
            .await
            .unwrap();
        let mut events = store.subscribe();

        let result = store.add(milk_tea(), 1).await;
        assert!(matches!(result, Err(CartError::Storage(_))));
        assert!(store.cart().await.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_ref_after_remove() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;

        store.add(milk_tea(), 1).await.unwrap();
        let second = store.add(milk_tea(), 3).await.unwrap();
        store.remove(0).await.unwrap();

        let result = store.set_quantity_at(second, 5).await;
        assert!(matches!(
            result,
            Err(CartError::Core(CoreError::StaleLineReference { .. }))
        ));
        assert_eq!(store.cart().await.lines()[0].quantity(), 3);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;

        store.add(milk_tea(), 1).await.unwrap();
        store.set_quantity(0, 0).await.unwrap();
        assert!(store.cart().await.is_empty());
        assert_eq!(storage.load("cart").await.unwrap(), Some(json!([])));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;
        let mut events = store.subscribe();

        store.add(milk_tea(), 1).await.unwrap();
        match events.recv().await.unwrap() {
            CartEvent::Changed(snapshot) => assert_eq!(snapshot.totals.line_count, 1),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_view_reloads_after_write() {
        let storage = MemoryDocumentStore::new();
        let kiosk = Arc::new(open(&storage).await);
        let cashier = open(&storage).await;

        let mut events = kiosk.subscribe();
        let _watch = kiosk.watch();

        cashier.add(milk_tea(), 2).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            CartEvent::Reloaded(snapshot) => {
                assert_eq!(snapshot.items.len(), 1);
                assert_eq!(snapshot.totals.total.cents(), 953);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clear_if_unchanged_keeps_new_lines() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;
        store.add(milk_tea(), 1).await.unwrap();

        let submitted = store.cart().await;
        store.add(milk_tea(), 2).await.unwrap();
        assert!(!store.clear_if_unchanged(&submitted).await.unwrap());
        assert_eq!(store.cart().await.len(), 2);

        let submitted = store.cart().await;
        assert!(store.clear_if_unchanged(&submitted).await.unwrap());
        assert!(store.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_if_unchanged_after_reload() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;
        store.add(milk_tea(), 1).await.unwrap();

        let submitted = store.cart().await;
        store.sync_from_storage().await.unwrap();
        assert_ne!(store.cart().await.generation(), submitted.generation());

        assert!(store.clear_if_unchanged(&submitted).await.unwrap());
        assert!(store.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_all_is_all_or_nothing() {
        let storage = MemoryDocumentStore::new();
        let store = open(&storage).await;
        for _ in 0..99 {
            store.add(milk_tea(), 1).await.unwrap();
        }

        let result = store.add_all(vec![milk_tea(), milk_tea()]).await;
        assert!(matches!(
            result,
            Err(CartError::Core(CoreError::CartTooLarge { .. }))
        ));
        assert_eq!(store.cart().await.len(), 99);
    }
}
