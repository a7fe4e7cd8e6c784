//! HTTP-layer retry for store requests.
//!
//! Network failures, 429 and 5xx are retried with exponential back-off and
//! jitter. When the retries run out a 429/5xx *response* is handed back as-is
//! so the caller can inspect it like any other error status.

use std::future::Future;
use std::time::Duration;

use crate::error::WooError;
use crate::response::ApiResponse;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for transport errors worth another attempt.
pub(crate) fn is_retriable(err: &WooError) -> bool {
    match err {
        WooError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        WooError::InvalidBaseUrl { .. }
        | WooError::Serialize { .. }
        | WooError::Deserialize { .. }
        | WooError::UnexpectedStatus { .. } => false,
    }
}

/// Sleep before retry `attempt` (1-based): `base * 2^(attempt-1)` capped at
/// 60 s, then scaled by a random factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}

/// Runs `operation` with up to `max_retries` additional attempts.
pub(crate) async fn retry_with_backoff<F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<ApiResponse, WooError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ApiResponse, WooError>>,
{
    let mut attempt = 0u32;
    loop {
        let result = operation().await;
        let reason = match &result {
            Ok(response) if response.is_transient() => Some(format!("HTTP {}", response.status)),
            Err(err) if is_retriable(err) => Some(err.to_string()),
            _ => None,
        };
        let Some(reason) = reason else {
            return result;
        };
        if attempt >= max_retries {
            return result;
        }

        attempt += 1;
        let delay_ms = backoff_delay_ms(backoff_base_ms, attempt);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms,
            reason = %reason,
            "transient store error, retrying after back-off"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
