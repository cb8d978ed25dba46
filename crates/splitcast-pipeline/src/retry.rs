//! Retry with exponential backoff and failure classification.
//!
//! Every retried operation in the pipeline (download, extraction, render,
//! upload) goes through the same policy. Only transient failures are retried;
//! a permanent failure consumes exactly one attempt.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Classifies an error as worth retrying or not.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for splitcast_media::MediaError {
    fn is_transient(&self) -> bool {
        splitcast_media::MediaError::is_transient(self)
    }
}

impl Transient for splitcast_storage::StorageError {
    fn is_transient(&self) -> bool {
        splitcast_storage::StorageError::is_transient(self)
    }
}

impl Transient for crate::error::PipelineError {
    fn is_transient(&self) -> bool {
        crate::error::PipelineError::is_transient(self)
    }
}

/// Retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each transient failure.
    pub base_delay: Duration,
    /// Ceiling for backoff delays.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before the attempt following `completed_attempts` failures.
    fn delay_after(&self, completed_attempts: u32) -> Duration {
        let exponent = completed_attempts.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(2u32.pow(exponent));
        delay.min(self.max_delay)
    }

    /// Run an operation under this policy.
    ///
    /// The operation is re-invoked only for transient errors, up to
    /// `max_attempts` total invocations. The outcome reports how many
    /// attempts were consumed either way.
    pub async fn run<F, Fut, T, E>(&self, operation_name: &str, operation: F) -> RetryOutcome<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + std::fmt::Display,
    {
        let mut attempt = 1u32;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            "{} succeeded on attempt {}/{}",
                            operation_name, attempt, self.max_attempts
                        );
                    }
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    };
                }
                Err(e) if !e.is_transient() => {
                    warn!(
                        "{} failed permanently on attempt {}: {}",
                        operation_name, attempt, e
                    );
                    return RetryOutcome::Failed {
                        error: e,
                        attempts: attempt,
                    };
                }
                Err(e) if attempt >= self.max_attempts => {
                    warn!(
                        "{} exhausted all {} attempts: {}",
                        operation_name, self.max_attempts, e
                    );
                    return RetryOutcome::Failed {
                        error: e,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    debug!(
                        "{} attempt {}/{} failed, retrying in {:?}: {}",
                        operation_name, attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// Operation succeeded, possibly after retries.
    Success { value: T, attempts: u32 },
    /// Operation failed permanently or exhausted its attempts.
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. } => *attempts,
            RetryOutcome::Failed { attempts, .. } => *attempts,
        }
    }
}
