//! Rate table lifecycle: lazy fetch, TTL revalidation, last-good fallback.

use crate::core::currency::{self, CurrencyError, RateSource, RateTable};
use crate::core::freshness::is_stale;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Session-scoped supplier of the exchange-rate table.
///
/// The table is fetched lazily on first need and revalidated against the
/// same TTL gate as transaction data. A fetch that fails or exceeds the
/// timeout falls back to the last successfully fetched table; with no table
/// at all the caller gets [`CurrencyError::RatesUnavailable`] and can render
/// unconverted values. Callers serialize on the table lock, so concurrent
/// revalidations collapse to one fetch.
pub struct RateService {
    source: Arc<dyn RateSource>,
    ttl: Duration,
    fetch_timeout: Duration,
    table: Mutex<Option<RateTable>>,
}

impl RateService {
    pub fn new(source: Arc<dyn RateSource>, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            table: Mutex::new(None),
        }
    }

    /// Returns a usable rate table, fetching or revalidating as needed.
    pub async fn table(&self) -> Result<RateTable, CurrencyError> {
        let mut table = self.table.lock().await;

        if let Some(current) = table.as_ref() {
            if !is_stale(now_ms(), current.fetched_at, self.ttl) {
                return Ok(current.clone());
            }
            debug!("Rate table stale, revalidating");
        }

        match tokio::time::timeout(self.fetch_timeout, self.source.fetch_table()).await {
            Ok(Ok(fresh)) => {
                debug!("Fetched rate table with {} rates", fresh.rates.len());
                *table = Some(fresh.clone());
                Ok(fresh)
            }
            Ok(Err(e)) => {
                warn!("Rate fetch failed: {e:#}");
                table.clone().ok_or(CurrencyError::RatesUnavailable)
            }
            Err(_) => {
                warn!("Rate fetch timed out after {:?}", self.fetch_timeout);
                table.clone().ok_or(CurrencyError::RatesUnavailable)
            }
        }
    }

    /// Converts `amount` between two currencies via the active table.
    ///
    /// Identity conversions never need a table and so never fetch.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(amount);
        }
        let table = self.table().await?;
        currency::convert(amount, from, to, &table)
    }
}
