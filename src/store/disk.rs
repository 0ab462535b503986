use crate::core::transaction::CacheRecord;
use crate::store::{SnapshotStore, StoreError};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use tracing::debug;

/// Persistent snapshot store backed by a fjall keyspace.
///
/// Each user's record is one serde_json value under the user id key in a
/// single partition, so a save is one insert and readers never see a
/// half-written record.
pub struct FjallStore {
    _keyspace: Keyspace,
    snapshots: PartitionHandle,
}

impl FjallStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let keyspace = fjall::Config::new(data_dir.join("cache")).open()?;
        let snapshots = keyspace.open_partition("snapshots", PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            snapshots,
        })
    }
}

#[async_trait]
impl SnapshotStore for FjallStore {
    async fn save(&self, user_id: &str, record: &CacheRecord) -> Result<(), StoreError> {
        self.snapshots
            .insert(user_id, serde_json::to_vec(record)?)?;
        debug!("Store PUT for user: {user_id}");
        Ok(())
    }

    async fn restore(&self, user_id: &str) -> Result<Option<CacheRecord>, StoreError> {
        match self.snapshots.get(user_id)? {
            Some(bytes) => {
                debug!("Store HIT for user: {user_id}");
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            None => {
                debug!("Store MISS for user: {user_id}");
                Ok(None)
            }
        }
    }
}
