//! Retry utilities for storefront requests.
//!
//! Storefronts behind Shopify's edge answer bursts with 429 and the
//! occasional 502/503. Those, plus network failures, are retried with
//! exponential backoff. Everything else (404, parse failures, other 4xx)
//! is returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is a transient condition worth retrying.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. }
        | ScraperError::Deserialize { .. }
        | ScraperError::MissingProduct { .. }
        | ScraperError::InvalidShopUrl { .. }
        | ScraperError::Io { .. } => false,
    }
}

/// Longest wait between two attempts, whatever `Retry-After` asks for.
const MAX_DELAY_SECS: u64 = 60;

/// Wait before retry `attempt + 1`: exponential backoff, or a longer
/// `Retry-After`, capped at [`MAX_DELAY_SECS`].
fn delay_secs(err: &ScraperError, backoff_base_secs: u64, attempt: u32) -> u64 {
    let backoff_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
    let wanted = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } if backoff_base_secs > 0 => backoff_secs.max(*retry_after_secs),
        _ => backoff_secs,
    };
    wanted.min(MAX_DELAY_SECS)
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`
/// seconds, except for 429 responses carrying a `Retry-After` that asks for
/// longer; the longer of the two wins.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let wait_secs = delay_secs(&err, backoff_base_secs, attempt);
        attempt += 1;
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs = wait_secs,
            error = %err,
            "transient storefront error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(wait_secs)).await;
    }
}
