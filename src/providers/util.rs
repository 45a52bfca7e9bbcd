use anyhow::Error;
use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Sends a request, retrying transport failures and transient HTTP statuses
///
/// # Parameters
/// - `send`: Closure issuing the request
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// The first non-transient response, the last response once attempts run
/// out, or the last transport error
pub async fn with_retry<F, Fut>(mut send: F, retries: usize, delay_ms: u64) -> Result<Response, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        let retry_reason = match send().await {
            Ok(response) if is_transient(response.status()) => {
                if attempt > retries {
                    return Ok(response);
                }
                response.status().to_string()
            }
            Ok(response) => return Ok(response),
            Err(err) => {
                if attempt > retries {
                    return Err(Error::from(err));
                }
                err.to_string()
            }
        };
        debug!(
            "Attempt {}/{} failed: {}. Retrying...",
            attempt, retries, retry_reason
        );
        attempt += 1;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
