use crate::core::currency::{BASE_CURRENCY, RateSource, RateTable};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Built-in USD-pinned rate table covering the dashboard's supported
/// currencies. Used when no rate endpoint is configured.
///
/// `fetch_table` settles after a cooperative yield, never a timer: it
/// resolves once the current synchronous work has run, ahead of anything
/// timer-queued. Callers still must not assume a table before the first
/// resolution.
pub struct PinnedRates;

/// Multipliers relative to USD for the fixed supported set.
const PINNED: [(&str, f64); 8] = [
    ("VND", 24850.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("JPY", 151.2),
    ("CAD", 1.36),
    ("AUD", 1.52),
    ("CNY", 7.24),
    ("SGD", 1.34),
];

#[async_trait]
impl RateSource for PinnedRates {
    async fn fetch_table(&self) -> Result<RateTable> {
        tokio::task::yield_now().await;
        let rates: HashMap<String, f64> = PINNED
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        Ok(RateTable::new(
            BASE_CURRENCY,
            rates,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}
