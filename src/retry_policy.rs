//! Retry policy for calls to external collaborators.
//!
//! Implements bounded attempts with exponential backoff.

use crate::config::RetrySettings;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry policy implementing exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Cap for the exponential growth, in milliseconds.
    pub max_backoff_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_backoff_ms: settings.initial_backoff_ms,
            max_backoff_ms: settings.max_backoff_ms,
            backoff_multiplier: settings.backoff_multiplier,
        }
    }

    /// A policy that tries once and never waits.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay after the given number of failed attempts (0-based).
    ///
    /// `initial_backoff * multiplier^failed_attempt`, capped at `max_backoff_ms`.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(failed_attempt as i32);
        Duration::from_millis(backoff.min(self.max_backoff_ms as f64) as u64)
    }

    /// Whether another attempt is allowed after `attempts_made` attempts ended with `error`.
    pub fn should_retry<E: Retryable>(&self, error: &E, attempts_made: u32) -> bool {
        error.is_retryable() && attempts_made < self.max_attempts
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error, or the attempts
    /// are exhausted. The last error is returned.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts_made = 0;
        loop {
            attempts_made += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(&err, attempts_made) => {
                    let delay = self.backoff(attempts_made - 1);
                    warn!(
                        "{} failed (attempt {}/{}): {}, retrying in {:?}",
                        what, attempts_made, self.max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetrySettings::default())
    }
}
