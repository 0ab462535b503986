use crate::core::transaction::CacheRecord;
use crate::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory snapshot store using HashMap and a tokio Mutex.
///
/// The fallback tier when persistent storage is unavailable, and the store
/// of choice in tests. Records survive only as long as the process.
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, CacheRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, user_id: &str, record: &CacheRecord) -> Result<(), StoreError> {
        let mut records = self.inner.lock().await;
        debug!("Store PUT for user: {user_id}");
        records.insert(user_id.to_string(), record.clone());
        Ok(())
    }

    async fn restore(&self, user_id: &str) -> Result<Option<CacheRecord>, StoreError> {
        let records = self.inner.lock().await;
        let record = records.get(user_id).cloned();
        if record.is_some() {
            debug!("Store HIT for user: {user_id}");
        } else {
            debug!("Store MISS for user: {user_id}");
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use chrono::NaiveDate;

    fn sample_record() -> CacheRecord {
        CacheRecord {
            transactions: vec![Transaction {
                id: "t-1".to_string(),
                description: "Coffee".to_string(),
                amount: -4.5,
                category: "Food".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            }],
            fetched_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_store_save_restore() {
        let store = MemoryStore::new();

        // Initially, store is empty
        assert!(store.restore("u1").await.unwrap().is_none());

        store.save("u1", &sample_record()).await.unwrap();
        assert_eq!(store.restore("u1").await.unwrap(), Some(sample_record()));

        // A different user is still empty
        assert!(store.restore("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_record_wholesale() {
        let store = MemoryStore::new();
        store.save("u1", &sample_record()).await.unwrap();

        let replacement = CacheRecord {
            transactions: vec![],
            fetched_at: 1_700_000_999_000,
        };
        store.save("u1", &replacement).await.unwrap();

        let restored = store.restore("u1").await.unwrap().unwrap();
        assert!(restored.transactions.is_empty());
        assert_eq!(restored.fetched_at, 1_700_000_999_000);
    }
}
