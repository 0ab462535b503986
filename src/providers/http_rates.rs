use crate::core::currency::{BASE_CURRENCY, RateSource, RateTable};
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

const USER_AGENT: &str = concat!("finsync/", env!("CARGO_PKG_VERSION"));

/// Rate source speaking to a frankfurter-style endpoint pinned to USD.
///
/// `GET {base_url}/latest?base=USD` returns `{"base": "USD", "rates": {...}}`.
pub struct HttpRateSource {
    base_url: String,
}

impl HttpRateSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    base: String,
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_table(&self) -> Result<RateTable> {
        let url = format!("{}/latest?base={}", self.base_url, BASE_CURRENCY);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = with_retry(|| async { client.get(&url).send().await }, 3, 500)
            .await
            .context("Failed to send exchange rate request")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} fetching exchange rates",
                response.status()
            ));
        }

        let response_text = response
            .text()
            .await
            .context("Failed to get exchange rate response text")?;

        let parsed: RatesResponse = serde_json::from_str(&response_text).with_context(|| {
            format!("Failed to parse exchange rate response: '{response_text}'")
        })?;

        if parsed.base != BASE_CURRENCY {
            return Err(anyhow!(
                "Rate endpoint returned base '{}', expected '{}'",
                parsed.base,
                BASE_CURRENCY
            ));
        }

        debug!("Fetched {} exchange rates", parsed.rates.len());
        Ok(RateTable::new(
            BASE_CURRENCY,
            parsed.rates,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_builds_a_usd_pinned_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"base": "USD", "rates": {"VND": 24850.0, "EUR": 0.92}}"#,
            ))
            .mount(&server)
            .await;

        let table = HttpRateSource::new(&server.uri()).fetch_table().await.unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("VND"), Some(24850.0));
        assert_eq!(table.rate("USD"), Some(1.0));
    }

    #[tokio::test]
    async fn test_wrong_base_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"base": "EUR", "rates": {"USD": 1.09}}"#),
            )
            .mount(&server)
            .await;

        let err = HttpRateSource::new(&server.uri())
            .fetch_table()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("base 'EUR'"));
    }

    #[tokio::test]
    async fn test_http_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(HttpRateSource::new(&server.uri()).fetch_table().await.is_err());
    }
}
