//! Exponential-backoff retry around an async operation.
//!
//! Every failure is retried the same way: no jitter, no per-error policy and
//! no overall deadline beyond the growth of the delay.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each one after
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }

    /// Every wait this policy can produce, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_retries).map(|retry| self.delay_for(retry))
    }
}

/// Run `op` until it succeeds or the retry budget is spent.
///
/// When retries run out the last error is returned inside
/// [`ClientError::RetryExhausted`]. With `max_retries == 0` the single
/// failure is returned as is.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut retry = 0;
    loop {
        match op().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(label, retries = retry, "request recovered after retry");
                }
                return Ok(value);
            }
            Err(err) if retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                warn!(
                    label,
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "request failed, retrying"
                );
                sleep(delay).await;
            }
            Err(err) if policy.max_retries == 0 => return Err(err),
            Err(err) => {
                warn!(label, retries = retry, error = %err, "retries exhausted");
                return Err(ClientError::RetryExhausted {
                    retries: retry,
                    source: Box::new(err),
                });
            }
        }
    }
}
