use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};

/// Exponential backoff used while waiting for a store to come up.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Scale each delay into [50%, 100%] of its nominal value
    pub jitter: bool,
}

impl BackoffPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Nominal delay after the given failed attempt (1-based), before jitter.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exp);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

#[cfg(feature = "config")]
impl FromEnv for BackoffPolicy {
    /// - `DB_CONNECT_MAX_ATTEMPTS`: defaults to 5
    /// - `DB_CONNECT_INITIAL_DELAY_MS`: defaults to 200
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(defaults
            .clone()
            .with_max_attempts(env_parse("DB_CONNECT_MAX_ATTEMPTS", defaults.max_attempts)?)
            .with_initial_delay(Duration::from_millis(env_parse(
                "DB_CONNECT_INITIAL_DELAY_MS",
                defaults.initial_delay.as_millis() as u64,
            )?)))
    }
}

/// Run `operation` until it succeeds or the policy runs out of attempts.
///
/// `store` only labels the log lines. The last error is returned unchanged.
pub async fn with_backoff<F, Fut, T, E>(
    store: &str,
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(store, attempt, "connected after retrying");
                }
                return Ok(value);
            }
            Err(e) if attempt >= policy.max_attempts => {
                warn!(store, attempt, error = %e, "giving up on connection");
                return Err(e);
            }
            Err(e) => {
                let mut delay = policy.delay_after(attempt);
                if policy.jitter {
                    delay = jitter(delay);
                }
                warn!(
                    store,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "connection attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn jitter(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let seed = RandomState::new().hash_one(std::time::SystemTime::now());
    let factor = 0.5 + (seed % 51) as f64 / 100.0;
    delay.mul_f64(factor)
}
