//! Retry with exponential backoff
//!
//! Only read-only calls are retried. Mutations and blob transfers are never
//! replayed automatically because a replay could duplicate server state.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::rpc::RpcError;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (zero-based)
    fn delay_for(&self, attempt: usize) -> Duration {
        let millis =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

/// Retry an async operation while `should_retry` accepts the error
///
/// Returns the error of the final attempt once retries are exhausted.
pub async fn retry<F, Fut, T, E>(
    config: &RetryConfig,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < config.max_retries && should_retry(&err) => {
                let delay = config.delay_for(attempt);
                attempt += 1;
                tracing::debug!(attempt, ?delay, "retrying after recoverable failure");
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Retry an RPC call on network errors only
pub async fn network_retry<F, Fut, T>(max_retries: usize, operation: F) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RpcError>>,
{
    retry(&RetryConfig::new(max_retries), RpcError::is_network_error, operation).await
}
