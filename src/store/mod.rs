//! Persistence for cached transaction records.

pub mod disk;
pub mod memory;

use crate::core::transaction::CacheRecord;
use async_trait::async_trait;
use disk::FjallStore;
use memory::MemoryStore;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] fjall::Error),
    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Key-value persistence for the last-fetched transaction record, one record
/// per user id.
///
/// `save` is a single logical write: a reader never observes a partially
/// written record. `restore` hands back whatever the previous write left,
/// fresh or stale; staleness is the caller's call, not the store's.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, user_id: &str, record: &CacheRecord) -> Result<(), StoreError>;
    async fn restore(&self, user_id: &str) -> Result<Option<CacheRecord>, StoreError>;
}

/// Session-scoped store: fjall-backed when the data directory is usable,
/// in-memory otherwise.
///
/// Every save is written through to memory as well, so when a disk operation
/// fails mid-session the store degrades to memory-only for the remainder of
/// the session without losing anything this session wrote. Storage trouble is
/// logged, never surfaced to readers.
pub struct SessionStore {
    disk: Option<FjallStore>,
    memory: MemoryStore,
    degraded: AtomicBool,
}

impl SessionStore {
    pub fn open(data_dir: &Path) -> Self {
        let disk = match FjallStore::open(data_dir) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Persistent store unavailable, running in-memory only: {e}");
                None
            }
        };
        SessionStore {
            disk,
            memory: MemoryStore::new(),
            degraded: AtomicBool::new(false),
        }
    }

    pub fn in_memory() -> Self {
        SessionStore {
            disk: None,
            memory: MemoryStore::new(),
            degraded: AtomicBool::new(false),
        }
    }

    fn disk(&self) -> Option<&FjallStore> {
        if self.degraded.load(Ordering::Relaxed) {
            return None;
        }
        self.disk.as_ref()
    }

    fn degrade(&self, op: &str, e: StoreError) {
        warn!("Persistent store {op} failed, degrading to in-memory for this session: {e}");
        self.degraded.store(true, Ordering::Relaxed);
    }
}

#[async_trait]
impl SnapshotStore for SessionStore {
    async fn save(&self, user_id: &str, record: &CacheRecord) -> Result<(), StoreError> {
        if let Some(disk) = self.disk() {
            if let Err(e) = disk.save(user_id, record).await {
                self.degrade("write", e);
            }
        }
        self.memory.save(user_id, record).await
    }

    async fn restore(&self, user_id: &str) -> Result<Option<CacheRecord>, StoreError> {
        if let Some(disk) = self.disk() {
            match disk.restore(user_id).await {
                Ok(found) => return Ok(found),
                Err(e) => self.degrade("read", e),
            }
        }
        self.memory.restore(user_id).await
    }
}
