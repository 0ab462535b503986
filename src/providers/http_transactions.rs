use crate::core::transaction::{Transaction, TransactionSource};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

const USER_AGENT: &str = concat!("finsync/", env!("CARGO_PKG_VERSION"));

/// Transaction source speaking to the dashboard backend over HTTP.
///
/// `GET {base_url}/users/{user_id}/transactions` returns a JSON array of
/// transactions, most-recent-first. Transport errors are retried; HTTP
/// error statuses and malformed bodies are not.
pub struct HttpTransactionSource {
    base_url: String,
}

impl HttpTransactionSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    async fn query(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let url = format!("{}/users/{}/transactions", self.base_url, user_id);
        debug!("Requesting transactions from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .with_context(|| format!("Failed to send request for user: {user_id}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} fetching transactions for user: {}",
                response.status(),
                user_id
            ));
        }

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for user: {user_id}"))?;

        let transactions: Vec<Transaction> = serde_json::from_str(&response_text)
            .with_context(|| {
                format!(
                    "Failed to parse transactions for user: {user_id}. Response: '{response_text}'",
                )
            })?;

        debug!(
            "Fetched {} transactions for user {}",
            transactions.len(),
            user_id
        );
        Ok(transactions)
    }
}
