//! Exponential backoff around any fallible async call.

use std::future::Future;

use synapse_types::config::RetryConfig;
use synapse_types::Result;

use crate::ports::TimerPort;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
        }
    }

    /// Delay before retry number `retry` (0-based): initial, 2x, 4x, ...
    pub fn delay_for(&self, retry: u32) -> u64 {
        self.initial_delay_ms.saturating_mul(1u64 << retry.min(32))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.initial_delay_ms)
    }
}

/// Call `op` until it succeeds or `policy.max_attempts` calls have failed,
/// sleeping on `timer` between attempts. The last error is returned.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    timer: &dyn TimerPort,
    label: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                log::warn!("{} failed after {} attempts: {}", label, attempt, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt - 1);
                log::warn!(
                    "{} failed ({}). Retrying in {}ms... ({} retries left)",
                    label,
                    e,
                    delay,
                    attempts - attempt
                );
                timer.sleep(delay).await;
            }
        }
    }
}
