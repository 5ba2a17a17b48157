//! Fixed-delay retry for applying a message, aborted by cancellation.

use crate::error::StreamError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Never below 1.
    pub attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(1))
    }
}

/// Run `operation` up to `policy.attempts` times.
///
/// The first attempt always runs. If `cancel` fires while waiting between
/// attempts, the wait is abandoned and [`StreamError::Shutdown`] is returned
/// instead of the last failure. On exhaustion the last error is returned.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, StreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StreamError>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.attempts => return Err(e),
            Err(e) => {
                debug!(attempt, attempts = policy.attempts, error = %e, "attempt failed, retrying");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(StreamError::Shutdown),
                    _ = tokio::time::sleep(policy.delay) => {}
                }
                attempt += 1;
            }
        }
    }
}
