//! Retry with exponential backoff for tile requests.
//!
//! Transient failures (timeouts, connection errors, HTTP 429 and 5xx) are
//! retried up to [`RetryPolicy::max_retries`] times, waiting
//! `base_delay`, `2 x base_delay`, `4 x base_delay`... between attempts.
//! Any other 4xx is permanent and fails immediately.

use std::future::Future;
use std::time::Duration;

use geology_map_models::config::BasemapConfig;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &BasemapConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Wait before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1_u32 << doublings)
    }
}

/// Outcome of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Worth retrying.
    Transient(String),
    /// Retrying will not help.
    Permanent(String),
}

impl FetchFailure {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transient(message) | Self::Permanent(message) => message,
        }
    }
}

/// Classifies an HTTP status. `None` means success.
#[must_use]
pub fn classify_status(status: reqwest::StatusCode) -> Option<FetchFailure> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Some(FetchFailure::Transient(format!("HTTP {status} (rate limited)")))
    } else if status.is_server_error() {
        Some(FetchFailure::Transient(format!("HTTP {status} (server error)")))
    } else if status.is_client_error() {
        Some(FetchFailure::Permanent(format!("HTTP {status}")))
    } else {
        None
    }
}

/// Classifies a transport-level error.
#[must_use]
pub fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request() {
        FetchFailure::Transient(e.to_string())
    } else {
        FetchFailure::Permanent(e.to_string())
    }
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of
/// retries. `label` identifies the request in log lines.
///
/// # Errors
///
/// Returns the last [`FetchFailure`] if no attempt succeeded.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    operation: F,
) -> Result<T, FetchFailure>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchFailure>>,
{
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            log::warn!(
                "  retry {attempt}/{} for {label} in {delay:?}...",
                policy.max_retries
            );
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(FetchFailure::Transient(message)) if attempt < policy.max_retries => {
                log::warn!("  transient error for {label}: {message}");
                attempt += 1;
            }
            Err(failure) => return Err(failure),
        }
    }
}
