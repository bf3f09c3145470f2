//! Retry execution engine
//!
//! This module provides the core retry execution logic with configurable
//! policies, observers, and cooperative cancellation.

use std::future::Future;
use std::time::Instant;

use crate::types::RetryPolicy;

use super::cancel::CancelToken;
use super::error::{KindedError, RetryError};
use super::observer::{AttemptRecord, NoOpObserver, OutcomeRecord, RetryObserver};
use super::strategies::calculate_delay;

/// Execute an async operation with retry logic based on a policy
///
/// This is a convenience function for simple retry scenarios. For more
/// control, use `RetryExecutorBuilder`.
///
/// # Arguments
///
/// * `policy` - The retry policy to use
/// * `op` - A closure that returns a future representing the operation
///
/// # Returns
///
/// The result of the operation, or a `RetryError` if all attempts fail.
///
/// # Example
///
/// ```rust,no_run
/// use brokkr_core::retry::retry_with_policy;
/// use brokkr_core::types::RetryPolicy;
///
/// async fn example() {
///     let policy = RetryPolicy::default();
///
///     let result = retry_with_policy(&policy, || async {
///         // Simulated operation that might fail
///         Ok::<_, std::io::Error>("success")
///     }).await;
/// }
/// ```
pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: KindedError + Send + 'static,
{
    RetryExecutorBuilder::new()
        .with_policy(policy.clone())
        .build()
        .execute(op)
        .await
}

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use brokkr_core::retry::{CancelToken, RetryExecutorBuilder, TracingObserver};
/// use brokkr_core::types::RetryPolicy;
///
/// let cancel = CancelToken::new();
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::default())
///     .with_observer(TracingObserver::new("convert"))
///     .with_cancellation(cancel.clone())
///     .with_jitter(true)
///     .build();
/// ```
pub struct RetryExecutorBuilder<O = NoOpObserver> {
    policy: RetryPolicy,
    observer: O,
    jitter: bool,
    cancel: Option<CancelToken>,
}

impl Default for RetryExecutorBuilder<NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<NoOpObserver> {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            observer: NoOpObserver,
            jitter: false,
            cancel: None,
        }
    }
}

impl<O> RetryExecutorBuilder<O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the observer
    ///
    /// The observer receives callbacks during retry execution.
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            observer,
            jitter: self.jitter,
            cancel: self.cancel,
        }
    }

    /// Set the cancellation token
    ///
    /// The executor checks the token between attempts only; an in-flight
    /// attempt is never interrupted. Hand a clone of the same token to the
    /// operation if it supports early exit.
    pub fn with_cancellation(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Enable or disable jitter
    ///
    /// Jitter adds up to 25% random variation to retry delays to prevent
    /// thundering herd. Disabled by default, so the configured backoff
    /// schedule holds exactly unless opted in.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<O> {
        RetryExecutor {
            policy: self.policy,
            observer: self.observer,
            jitter: self.jitter,
            cancel: self.cancel,
        }
    }
}

/// A retry executor with configurable policy, observer, and cancellation
///
/// Use `RetryExecutorBuilder` to create an instance. Attempts run strictly
/// sequentially; attempt n+1 starts only after attempt n has failed and the
/// computed backoff delay has elapsed.
pub struct RetryExecutor<O> {
    policy: RetryPolicy,
    observer: O,
    jitter: bool,
    cancel: Option<CancelToken>,
}

impl<O> RetryExecutor<O>
where
    O: RetryObserver,
{
    /// Execute an operation with retry logic
    ///
    /// Each failed attempt emits an `AttemptRecord` to the observer before
    /// the backoff delay begins. Exactly one `OutcomeRecord` is emitted per
    /// call that runs to completion; a cancelled run emits `on_cancelled`
    /// instead.
    ///
    /// # Arguments
    ///
    /// * `op` - A closure that returns a future representing the operation
    ///
    /// # Returns
    ///
    /// The result of the operation, or a `RetryError` carrying the last
    /// attempt's error once the budget is exhausted. The final error is
    /// never swallowed.
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: KindedError + Send + 'static,
    {
        let start = Instant::now();

        for attempt in 1..=self.policy.max_attempts {
            self.observer
                .on_attempt_start(attempt, self.policy.max_attempts);

            match op().await {
                Ok(result) => {
                    let outcome = OutcomeRecord {
                        succeeded: true,
                        total_attempts: attempt,
                        total_duration: start.elapsed(),
                    };
                    self.observer.on_outcome(&outcome);
                    return Ok(result);
                }
                Err(err) => {
                    let record = AttemptRecord::from_error(attempt, &err, start.elapsed());

                    // Check if this was the last attempt
                    if attempt >= self.policy.max_attempts {
                        self.observer.on_attempt_failed(&record, None);
                        let outcome = OutcomeRecord {
                            succeeded: false,
                            total_attempts: attempt,
                            total_duration: start.elapsed(),
                        };
                        self.observer.on_outcome(&outcome);
                        return Err(RetryError::exhausted(attempt, err, start.elapsed()));
                    }

                    // Calculate delay for next attempt
                    let delay = calculate_delay(&self.policy, attempt, self.jitter);

                    self.observer.on_attempt_failed(&record, Some(delay));

                    if self.is_cancelled() {
                        self.observer.on_cancelled(attempt, start.elapsed());
                        return Err(RetryError::cancelled(attempt, Some(err)));
                    }

                    // Wait before next attempt
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }

                    if self.is_cancelled() {
                        self.observer.on_cancelled(attempt, start.elapsed());
                        return Err(RetryError::cancelled(attempt, Some(err)));
                    }
                }
            }
        }

        // Only reachable with max_attempts == 0
        Err(RetryError::cancelled(0, None))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(CancelToken::is_cancelled)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RetryStats;
    use crate::types::RetryStrategy;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            strategy: RetryStrategy::FixedDelay,
            backoff_multiplier: 2.0,
            initial_delay_ms: 10, // Short delays for tests
            max_delay_ms: 100,
        }
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let policy = test_policy();
        let stats = Arc::new(RetryStats::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_observer(stats.clone())
            .build()
            .execute(|| async { Ok("success") })
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "success");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.successes, 1);
        assert_eq!(snapshot.failures, 0);
        assert_eq!(snapshot.total_attempts, 1);
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let policy = test_policy();
        let stats = Arc::new(RetryStats::new());
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_observer(stats.clone())
            .build()
            .execute(|| {
                let attempts = attempts_clone.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if attempt < 2 {
                        Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"))
                    } else {
                        Ok("success")
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "success");

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.successes, 1);
        assert_eq!(snapshot.failures, 0);
        assert_eq!(snapshot.total_attempts, 2);
        assert_eq!(snapshot.most_common_error, "timed_out");
    }

    #[tokio::test]
    async fn test_all_attempts_exhausted() {
        let policy = test_policy();
        let stats = Arc::new(RetryStats::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(policy.clone())
            .with_observer(stats.clone())
            .build()
            .execute(|| async {
                Err(io::Error::new(io::ErrorKind::TimedOut, "always fails"))
            })
            .await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), policy.max_attempts);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.total_attempts, 3);
    }

    #[tokio::test]
    async fn test_cancellation_between_attempts() {
        let policy = test_policy();
        let stats = Arc::new(RetryStats::new());
        let cancel = CancelToken::new();
        let cancel_clone = cancel.clone();

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_observer(stats.clone())
            .with_cancellation(cancel)
            .build()
            .execute(|| {
                let cancel = cancel_clone.clone();
                async move {
                    // Cancel from inside the first attempt; the attempt itself
                    // still completes and fails normally
                    cancel.cancel();
                    Err(io::Error::new(io::ErrorKind::TimedOut, "slow upload"))
                }
            })
            .await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.attempts(), 1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cancellations, 1);
        // No outcome record is emitted for a cancelled run
        assert_eq!(snapshot.successes, 0);
        assert_eq!(snapshot.failures, 0);
    }

    #[tokio::test]
    async fn test_retry_with_policy_convenience() {
        let policy = test_policy();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result = retry_with_policy(&policy, || {
            let attempts = attempts_clone.clone();
            async move {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 2 {
                    Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"))
                } else {
                    Ok("success")
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..test_policy()
        };

        let result: Result<&str, RetryError<io::Error>> = retry_with_policy(&policy, || async {
            Err(io::Error::other("error"))
        })
        .await;

        // With 0 max attempts, we should get a cancelled error
        assert!(result.is_err());
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..test_policy()
        };
        let stats = Arc::new(RetryStats::new());

        let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_observer(stats.clone())
            .build()
            .execute(|| async { Err(io::Error::other("single try")) })
            .await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.total_attempts, 1);
    }
}
