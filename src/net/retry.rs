//! Retry with exponential backoff for transport failures.
//!
//! Wraps `backon` so every API call shares one policy. Only errors for which
//! [`AuthError::is_retryable`] holds are repeated; a backend decision is
//! returned on the first attempt.

#[cfg(test)]
#[path = "retry_test.rs"]
mod retry_test;

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f32,
    /// Randomize each delay to spread out clients that failed together.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        // backon counts retries, not attempts.
        let max_retries = self.max_attempts.saturating_sub(1) as usize;
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.initial_backoff)
            .with_max_delay(self.max_backoff)
            .with_factor(self.multiplier)
            .with_max_times(max_retries);
        if self.jitter { builder.with_jitter() } else { builder }
    }
}

/// Run `operation`, retrying network failures according to `policy`.
///
/// Only for idempotent requests: a retried 5xx or timeout may repeat work the
/// server already did.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last network error once
/// attempts are exhausted.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation_name: &'static str, operation: F) -> AuthResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AuthResult<T>>,
{
    retry_when(policy, operation_name, AuthError::is_retryable, operation).await
}

/// Run a non-idempotent `operation`, retrying only when the request never
/// reached the server.
///
/// # Errors
///
/// Returns the first error that may have been seen by the server, or the
/// last connect failure once attempts are exhausted.
pub async fn with_retry_unsent<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &'static str,
    operation: F,
) -> AuthResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AuthResult<T>>,
{
    retry_when(policy, operation_name, AuthError::is_unsent, operation).await
}

async fn retry_when<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &'static str,
    retryable: fn(&AuthError) -> bool,
    operation: F,
) -> AuthResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AuthResult<T>>,
{
    operation
        .retry(policy.backoff())
        .sleep(tokio::time::sleep)
        .when(retryable)
        .notify(|err: &AuthError, delay: Duration| {
            tracing::debug!(
                operation = operation_name,
                backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying after backoff"
            );
        })
        .await
}
