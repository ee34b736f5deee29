//! Retry policy for rate-limited (429) responses.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::{PdfDancerError, PdfDancerResult};

/// Result of a single attempt
pub(crate) enum Outcome<T> {
    Ready(T),
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },
}

/// Integral `Retry-After` seconds. HTTP-date values are ignored.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Exponential backoff for the given zero-based retry, capped at the configured maximum
pub(crate) fn backoff_delay(retry: u32, config: &RetryConfig) -> Duration {
    config
        .initial_backoff()
        .saturating_mul(2u32.saturating_pow(retry))
        .min(config.max_backoff())
}

fn next_delay(retry: u32, retry_after: Option<Duration>, config: &RetryConfig) -> Duration {
    retry_after.unwrap_or_else(|| backoff_delay(retry, config))
}

/// Run `attempt` until it is not rate limited or retries are exhausted
pub(crate) async fn run<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut attempt: F,
) -> PdfDancerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PdfDancerResult<Outcome<T>>>,
{
    let mut retries = 0;
    loop {
        match attempt().await? {
            Outcome::Ready(value) => return Ok(value),
            Outcome::RateLimited {
                retry_after,
                message,
            } => {
                if retries >= config.max_retries {
                    return Err(PdfDancerError::RateLimited {
                        retry_after,
                        message,
                    });
                }
                let delay = next_delay(retries, retry_after, config);
                warn!(
                    request = %label,
                    retry = retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, retrying"
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
        }
    }
}
