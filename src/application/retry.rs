//! Fixed-delay retry for storage calls.
//!
//! Only transient failures (`DATABASE_ERROR`, `INTERNAL_ERROR`) are retried.
//! Write conflicts are returned immediately: the caller re-reads instead of
//! repeating a mutation someone else already applied.

use std::future::Future;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Retries an operation a fixed number of times with a constant delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True if `err` is worth another attempt.
    pub fn is_transient(err: &DomainError) -> bool {
        matches!(err.code, ErrorCode::DatabaseError | ErrorCode::InternalError)
    }

    /// Runs `attempt` until it succeeds, fails permanently, or the attempts
    /// run out. Returns the last error in the latter two cases.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut tries = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if Self::is_transient(&err) && tries < self.max_attempts => {
                    tracing::warn!(
                        operation,
                        attempt = tries,
                        max_attempts = self.max_attempts,
                        "Transient failure, retrying in {:?}: {}",
                        self.delay,
                        err
                    );
                    tokio::time::sleep(self.delay).await;
                    tries += 1;
                }
                Err(err) => {
                    if Self::is_transient(&err) {
                        tracing::error!(operation, attempts = tries, "Giving up: {}", err);
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}
