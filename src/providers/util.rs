use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries a transient-failure-prone HTTP operation.
///
/// Runs `operation` once plus up to `retries` retry attempts, sleeping
/// `delay_ms` between attempts. Only transport-level errors are retried;
/// callers check HTTP statuses themselves on the returned response.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
