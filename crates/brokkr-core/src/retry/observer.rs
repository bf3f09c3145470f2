//! Retry observation and logging
//!
//! This module defines the event records emitted by the retry engine, the
//! `RetryObserver` trait for receiving them, and a `TracingObserver`
//! implementation that logs using the `tracing` crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::KindedError;

/// Record of a single failed attempt
///
/// Emitted once per failed attempt, including the final one, before any
/// backoff delay begins. Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// The attempt number that failed (1-indexed)
    pub attempt_number: u32,

    /// Stable label for the error category
    pub error_kind: String,

    /// Human-readable error message
    pub error_message: String,

    /// Time elapsed since the first attempt started
    pub elapsed_since_start: Duration,
}

impl AttemptRecord {
    /// Build a record from a failed attempt's error
    pub fn from_error<E: KindedError>(
        attempt_number: u32,
        error: &E,
        elapsed_since_start: Duration,
    ) -> Self {
        Self {
            attempt_number,
            error_kind: error.kind().to_string(),
            error_message: error.to_string(),
            elapsed_since_start,
        }
    }
}

/// Record of a completed retry run
///
/// Emitted exactly once per `execute` call, whether the operation eventually
/// succeeded or the attempt budget was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Whether the operation eventually succeeded
    pub succeeded: bool,

    /// Total number of attempts made
    pub total_attempts: u32,

    /// Total time spent across all attempts
    pub total_duration: Duration,
}

/// Observer trait for retry lifecycle events
///
/// Implement this trait to receive callbacks during retry execution.
/// This is useful for logging, statistics collection, or debugging.
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number (1-indexed)
    /// * `max_attempts` - The maximum number of attempts configured
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// Called when an attempt fails, before any backoff delay begins
    ///
    /// # Arguments
    ///
    /// * `record` - The attempt record for the failure
    /// * `next_delay` - The delay before the next attempt, or `None` when
    ///   this was the final attempt
    fn on_attempt_failed(&self, record: &AttemptRecord, next_delay: Option<Duration>);

    /// Called exactly once when the run completes
    ///
    /// `record.succeeded` distinguishes success from exhaustion.
    fn on_outcome(&self, record: &OutcomeRecord);

    /// Called when the retry loop is cancelled between attempts
    ///
    /// # Arguments
    ///
    /// * `attempts` - Number of attempts made before cancellation
    /// * `elapsed` - Time elapsed since the first attempt started
    fn on_cancelled(&self, attempts: u32, elapsed: Duration) {
        // Default implementation does nothing
        let _ = (attempts, elapsed);
    }
}

/// A no-op observer that does nothing
///
/// Use this when you don't need observation but the API requires an observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _record: &AttemptRecord, _next_delay: Option<Duration>) {}

    fn on_outcome(&self, _record: &OutcomeRecord) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_outcome`: INFO (success after retry), DEBUG (first-attempt
///   success), ERROR (exhaustion)
/// - `on_cancelled`: WARN
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried (for log context)
    operation: String,
}

impl TracingObserver {
    /// Create a new tracing observer
    ///
    /// # Arguments
    ///
    /// * `operation` - A descriptive name for the operation being retried
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Get the operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            max_attempts = max_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, record: &AttemptRecord, next_delay: Option<Duration>) {
        match next_delay {
            Some(delay) => tracing::warn!(
                operation = %self.operation,
                attempt = record.attempt_number,
                error_kind = %record.error_kind,
                error = %record.error_message,
                delay_ms = delay.as_millis() as u64,
                "attempt failed, will retry"
            ),
            None => tracing::warn!(
                operation = %self.operation,
                attempt = record.attempt_number,
                error_kind = %record.error_kind,
                error = %record.error_message,
                "final attempt failed"
            ),
        }
    }

    fn on_outcome(&self, record: &OutcomeRecord) {
        if !record.succeeded {
            tracing::error!(
                operation = %self.operation,
                attempts = record.total_attempts,
                total_duration_ms = record.total_duration.as_millis() as u64,
                "all retry attempts exhausted"
            );
        } else if record.total_attempts > 1 {
            tracing::info!(
                operation = %self.operation,
                attempts = record.total_attempts,
                total_duration_ms = record.total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = record.total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_cancelled(&self, attempts: u32, elapsed: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempts = attempts,
            elapsed_ms = elapsed.as_millis() as u64,
            "retry cancelled"
        );
    }
}

/// Implement RetryObserver for Arc<T> where T: RetryObserver
impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, record: &AttemptRecord, next_delay: Option<Duration>) {
        (**self).on_attempt_failed(record, next_delay)
    }

    fn on_outcome(&self, record: &OutcomeRecord) {
        (**self).on_outcome(record)
    }

    fn on_cancelled(&self, attempts: u32, elapsed: Duration) {
        (**self).on_cancelled(attempts, elapsed)
    }
}

/// Implement RetryObserver for Box<T> where T: RetryObserver
impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, record: &AttemptRecord, next_delay: Option<Duration>) {
        (**self).on_attempt_failed(record, next_delay)
    }

    fn on_outcome(&self, record: &OutcomeRecord) {
        (**self).on_outcome(record)
    }

    fn on_cancelled(&self, attempts: u32, elapsed: Duration) {
        (**self).on_cancelled(attempts, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_attempt_record_from_error() {
        let error = io::Error::new(io::ErrorKind::TimedOut, "upload timed out");
        let record = AttemptRecord::from_error(2, &error, Duration::from_millis(150));

        assert_eq!(record.attempt_number, 2);
        assert_eq!(record.error_kind, "timed_out");
        assert_eq!(record.error_message, "upload timed out");
        assert_eq!(record.elapsed_since_start, Duration::from_millis(150));
    }

    #[test]
    fn test_attempt_record_serialization() {
        let record = AttemptRecord {
            attempt_number: 1,
            error_kind: "timed_out".to_string(),
            error_message: "upload timed out".to_string(),
            elapsed_since_start: Duration::from_millis(150),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""attempt_number":1"#));
        assert!(json.contains(r#""error_kind":"timed_out"#));

        let deserialized: AttemptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_noop_observer() {
        let observer = NoOpObserver;
        let record = AttemptRecord {
            attempt_number: 1,
            error_kind: "io".to_string(),
            error_message: "test".to_string(),
            elapsed_since_start: Duration::from_millis(10),
        };
        let outcome = OutcomeRecord {
            succeeded: true,
            total_attempts: 2,
            total_duration: Duration::from_millis(500),
        };

        // These should all be no-ops
        observer.on_attempt_start(1, 3);
        observer.on_attempt_failed(&record, Some(Duration::from_millis(100)));
        observer.on_outcome(&outcome);
        observer.on_cancelled(2, Duration::from_millis(200));
    }

    #[test]
    fn test_tracing_observer_creation() {
        let observer = TracingObserver::new("convert");
        assert_eq!(observer.operation(), "convert");

        let default_observer = TracingObserver::default();
        assert_eq!(default_observer.operation(), "retry");
    }
}
