//! Retry utility for handling transient errors in async operations
//!
//! Provides configurable retry policies with exponential backoff. Callers decide
//! which failures are transient through a predicate, so permanent failures
//! (authentication, missing resources) surface on the first attempt.

use std::time::Duration;
use tokio::time::sleep;

/// Configurable retry policy for async operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
    pub backoff_factor: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
            backoff_factor: 2,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given zero-based failed attempt
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = self
            .backoff_factor
            .max(1)
            .saturating_pow(attempt.min(16) as u32);
        self.delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Outcome of inspecting a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up and surface the error
    Stop,
    /// Retry after the policy's backoff delay
    Backoff,
    /// Retry after an explicit delay (e.g. a server supplied Retry-After)
    After(Duration),
}

/// Execute an async operation, retrying every failure
///
/// # Examples
/// ```rust
/// use authscan::core::retry::{retry_async, RetryPolicy};
///
/// # async fn example() -> Result<String, String> {
/// let result = retry_async("list_projects", RetryPolicy::default(), || async {
///     Ok::<String, String>("success".to_string())
/// })
/// .await?;
/// # Ok(result)
/// # }
/// ```
pub async fn retry_async<F, T, E, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_async_when(operation_name, policy, operation, |_| RetryDecision::Backoff).await
}

/// Execute an async operation, retrying only failures the classifier accepts
pub async fn retry_async_when<F, T, E, Fut, C>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    C: Fn(&E) -> RetryDecision,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => error,
        };

        attempt += 1;
        if attempt >= attempts {
            return Err(error);
        }

        let wait = match classify(&error) {
            RetryDecision::Stop => return Err(error),
            RetryDecision::Backoff => policy.delay_for(attempt - 1),
            RetryDecision::After(explicit) => explicit.min(policy.max_delay),
        };

        log::debug!(
            "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
            operation_name,
            attempt,
            attempts,
            wait,
            error
        );
        sleep(wait).await;
    }
}
