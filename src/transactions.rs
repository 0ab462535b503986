//! Freshness-gated, write-through transaction caching.

use crate::core::freshness::is_stale;
use crate::core::transaction::{CacheRecord, Transaction, TransactionSource};
use crate::store::SnapshotStore;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Per-user cache of the last fetched transaction list.
///
/// Reads go restore, gate, fetch, write-through: the persisted record is
/// consulted first, a fetch happens only when the gate reports it stale, and
/// a successful fetch replaces the record wholesale. A failed fetch keeps
/// serving the last-known-good record; the failure is logged, not raised.
pub struct TransactionCache {
    source: Arc<dyn TransactionSource>,
    store: Arc<dyn SnapshotStore>,
    ttl: Duration,
    // One guard per user id so concurrent stale reads collapse to one fetch.
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TransactionCache {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        store: Arc<dyn SnapshotStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            store,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the user's current transactions, refreshing from the source
    /// only when the cached record is stale or absent.
    ///
    /// Errors only when there is nothing cached and the fetch fails too.
    pub async fn current(&self, user_id: &str) -> Result<CacheRecord> {
        if let Some(record) = self.restore(user_id).await {
            if !is_stale(now_ms(), record.fetched_at, self.ttl) {
                debug!("Cache fresh for user: {user_id}");
                return Ok(record);
            }
            debug!("Cache stale for user: {user_id}");
        }

        let guard = self.guard_for(user_id).await;
        let _held = guard.lock().await;

        // Another caller may have refreshed while this one waited.
        let cached = self.restore(user_id).await;
        if let Some(record) = &cached {
            if !is_stale(now_ms(), record.fetched_at, self.ttl) {
                return Ok(record.clone());
            }
        }

        match self.fetch_and_store(user_id, cached.as_ref()).await {
            Ok(record) => Ok(record),
            Err(e) => match cached {
                // Availability over freshness: stale beats nothing.
                Some(record) => {
                    warn!("Refresh failed for user {user_id}, serving cached data: {e:#}");
                    Ok(record)
                }
                None => Err(e),
            },
        }
    }

    /// Forces a refetch regardless of freshness ("refresh now").
    ///
    /// On failure the previous record stays in place untouched, but the error
    /// is returned since the caller asked for fresh data explicitly.
    pub async fn refresh(&self, user_id: &str) -> Result<CacheRecord> {
        let guard = self.guard_for(user_id).await;
        let _held = guard.lock().await;

        let previous = self.restore(user_id).await;
        self.fetch_and_store(user_id, previous.as_ref()).await
    }

    /// Reads the cached record without ever touching the source.
    pub async fn peek(&self, user_id: &str) -> Option<CacheRecord> {
        self.restore(user_id).await
    }

    async fn fetch_and_store(
        &self,
        user_id: &str,
        previous: Option<&CacheRecord>,
    ) -> Result<CacheRecord> {
        let transactions: Vec<Transaction> = self
            .source
            .query(user_id)
            .await
            .with_context(|| format!("Failed to fetch transactions for user: {user_id}"))?;

        // fetched_at never moves backwards for a user, even if the wall
        // clock does.
        let floor = previous.map_or(0, |r| r.fetched_at);
        let record = CacheRecord {
            transactions,
            fetched_at: now_ms().max(floor),
        };

        if let Err(e) = self.store.save(user_id, &record).await {
            warn!("Failed to persist record for user {user_id}: {e}");
        }
        Ok(record)
    }

    async fn restore(&self, user_id: &str) -> Option<CacheRecord> {
        match self.store.restore(user_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Failed to restore record for user {user_id}: {e}");
                None
            }
        }
    }

    async fn guard_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut guards = self.in_flight.lock().await;
        Arc::clone(guards.entry(user_id.to_string()).or_default())
    }
}
