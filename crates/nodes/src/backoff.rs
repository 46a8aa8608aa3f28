//! Retry with exponential back-off.
//!
//! [`retry`] runs an async operation until it succeeds or the attempt budget
//! in [`BackoffPolicy`] is spent. Between attempts it sleeps
//! `initial_delay × multiplier^k`, where `k` counts retries from zero. There
//! is no jitter, so the schedule is fully determined by the policy.
//!
//! After the last failed attempt the operation's own error is returned
//! unchanged; no wrapper type is introduced.
//!
//! The executor does not bound concurrency. Pair it with
//! [`crate::ConcurrencyLimiter`] for that.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use pipeline::PolicyError;
use serde::Deserialize;
use tracing::warn;

/// Attempt budget and delay schedule for [`retry`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    multiplier: f64,
}

impl BackoffPolicy {
    /// Creates a policy.
    ///
    /// `max_attempts` counts the first call, so `1` disables retrying.
    /// `multiplier` must be finite and at least `1.0`.
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        multiplier: f64,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(PolicyError::InvalidMultiplier(multiplier));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            multiplier,
        })
    }

    /// Total number of calls made before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry_index` (zero-based).
    pub fn delay_before_retry(&self, retry_index: u32) -> Duration {
        let factor = self.multiplier.powi(i32::try_from(retry_index).unwrap_or(i32::MAX));
        let nanos = self.initial_delay.as_nanos() as f64 * factor;
        // Float-to-int casts saturate, so an absurd schedule caps out instead of panicking.
        Duration::from_nanos(nanos.round() as u64)
    }
}

impl Default for BackoffPolicy {
    /// Three attempts, one second apart, doubling.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

/// Serialisable form of [`BackoffPolicy`] as it appears in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackoffSettings {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Factor applied to the delay after each retry.
    pub backoff_multiplier: f64,
}

impl TryFrom<BackoffSettings> for BackoffPolicy {
    type Error = PolicyError;

    fn try_from(s: BackoffSettings) -> Result<Self, Self::Error> {
        BackoffPolicy::new(
            s.max_attempts,
            Duration::from_millis(s.initial_delay_ms),
            s.backoff_multiplier,
        )
    }
}

/// Runs `op` under `policy`, logging a warning before every retry.
pub async fn retry<T, E, F, Fut>(policy: &BackoffPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_with_observer(policy, op, |attempt, err: &E| {
        warn!(
            attempt,
            max_attempts = policy.max_attempts,
            delay_ms = policy.delay_before_retry(attempt - 1).as_millis() as u64,
            error = %err,
            "attempt failed; retrying"
        );
    })
    .await
}

/// Runs `op` under `policy`, calling `on_retry(attempt, &error)` instead of
/// logging before every retry. `attempt` is the one-based number of the
/// attempt that just failed.
pub async fn retry_with_observer<T, E, F, Fut, O>(
    policy: &BackoffPolicy,
    mut op: F,
    mut on_retry: O,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    O: FnMut(u32, &E),
{
    let mut retry_index = 0;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let attempt = retry_index + 1;
        if attempt >= policy.max_attempts {
            return Err(err);
        }

        on_retry(attempt, &err);
        tokio::time::sleep(policy.delay_before_retry(retry_index)).await;
        retry_index += 1;
    }
}
