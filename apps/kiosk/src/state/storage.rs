//! # Client-Local Durable Storage
//!
//! Whole-document key/value storage for the kiosk, plus the change
//! notification other views listen to.
//!
//! ```text
//! CartStore (view A) ──save("cart")──► DocumentStore ──StorageEvent{key, origin: A}──┐
//!                                          │                                         │
//!                                          ▼                                         ▼
//!                              memory map / SQLite documents          CartStore (view B)
//!                                                                     sync_from_storage()
//! ```
//!
//! Last write wins: a save replaces the whole document.

use async_trait::async_trait;
use boba_db::{Database, DbConfig, DbError, DocumentRepository};
use mockall::automock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

/// Buffered storage events per subscriber before the slowest one lags.
const EVENT_CAPACITY: usize = 64;

/// Identifies the view (window, tab, register screen) that wrote a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// A process-unique id for a new view.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ViewId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Published after every write or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub origin: ViewId,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage write failed: {0}")]
    WriteFailed(String),

    #[error("Storage database error: {0}")]
    Database(#[from] DbError),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[automock]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The stored document, or `None` if the key was never written.
    async fn load(&self, key: &str) -> StorageResult<Option<Value>>;

    async fn save(&self, key: &str, document: &Value, origin: ViewId) -> StorageResult<()>;

    async fn remove(&self, key: &str, origin: ViewId) -> StorageResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

fn publish(events: &broadcast::Sender<StorageEvent>, key: &str, origin: ViewId) {
    // No subscribers is fine.
    let _ = events.send(StorageEvent {
        key: key.to_string(),
        origin,
    });
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process storage. Clones share the same documents and events, so one
/// store can back several views.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        MemoryDocumentStore {
            documents: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    /// A store pre-filled with one document, as if written by an older build.
    pub fn with_document(key: impl Into<String>, document: Value) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        MemoryDocumentStore {
            documents: Arc::new(Mutex::new(HashMap::from([(key.into(), document)]))),
            events,
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.documents.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, document: &Value, origin: ViewId) -> StorageResult<()> {
        self.documents
            .lock()
            .await
            .insert(key.to_string(), document.clone());
        publish(&self.events, key, origin);
        Ok(())
    }

    async fn remove(&self, key: &str, origin: ViewId) -> StorageResult<()> {
        self.documents.lock().await.remove(key);
        publish(&self.events, key, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

// =============================================================================
// SQLite Store
// =============================================================================

/// Storage that survives restarts, in the kiosk's local SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    documents: DocumentRepository,
    events: broadcast::Sender<StorageEvent>,
}

impl SqliteDocumentStore {
    pub fn new(db: &Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SqliteDocumentStore {
            documents: db.documents(),
            events,
        }
    }

    /// Opens (creating and migrating if needed) the database at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(format!("{}: {}", parent.display(), e)))?;
        }
        let db = Database::new(DbConfig::new(path)).await?;
        Ok(SqliteDocumentStore::new(&db))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn load(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.documents.load(key).await?)
    }

    async fn save(&self, key: &str, document: &Value, origin: ViewId) -> StorageResult<()> {
        debug!(key, "Persisting document");
        self.documents.save(key, document).await?;
        publish(&self.events, key, origin);
        Ok(())
    }

    async fn remove(&self, key: &str, origin: ViewId) -> StorageResult<()> {
        self.documents.remove(key).await?;
        publish(&self.events, key, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
