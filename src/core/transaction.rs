//! Transaction models and the remote source abstraction.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ledger entry as served by the dashboard backend.
///
/// `amount` is signed: positive is income, negative is expense. The sign is
/// preserved unchanged through caching, persistence and conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
}

/// The cached unit for one user: the last fetched transaction list,
/// most-recent-first, and when it was fetched (Unix epoch milliseconds).
///
/// A refresh replaces the record wholesale; records are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub transactions: Vec<Transaction>,
    pub fetched_at: i64,
}

/// Remote source of a user's transactions.
///
/// Implementations return the list most-recent-first and may fail with
/// network or authorization errors.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn query(&self, user_id: &str) -> Result<Vec<Transaction>>;
}
