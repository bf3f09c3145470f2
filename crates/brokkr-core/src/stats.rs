//! Append-only retry statistics
//!
//! `RetryStats` is the built-in statistics sink for the retry engine. It
//! implements [`RetryObserver`](crate::retry::RetryObserver), so an
//! `Arc<RetryStats>` can be handed straight to the executor builder; the
//! embedding application reads derived metrics through [`snapshot`].
//!
//! Recording never fails. Error kinds are tallied under their raw string
//! label with no validation, so new kinds flow through without coordination.
//! Appends take a short write lock; concurrent runs may interleave their
//! events, and each run's records keep their emission order.
//!
//! [`snapshot`]: RetryStats::snapshot

use std::sync::RwLock;
use std::time::Duration;

use crate::retry::{AttemptRecord, OutcomeRecord, RetryObserver};

/// Accumulated retry statistics
///
/// Single logical writer per run (the executor), any number of readers.
/// Records are appended and never mutated or removed.
#[derive(Debug, Default)]
pub struct RetryStats {
    inner: RwLock<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    attempts: Vec<AttemptRecord>,
    outcomes: Vec<OutcomeRecord>,
    cancellations: u64,
    /// Error kind tally in first-seen order
    error_kinds: Vec<(String, u64)>,
    quota_usage: f64,
}

/// Point-in-time view of accumulated statistics
///
/// Recomputed on every [`RetryStats::snapshot`] call and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Number of completed runs (successes + failures)
    pub completed_runs: u64,

    /// Runs that eventually succeeded
    pub successes: u64,

    /// Runs that exhausted their attempt budget
    pub failures: u64,

    /// Runs cancelled between attempts
    pub cancellations: u64,

    /// Total attempts across all completed runs
    pub total_attempts: u64,

    /// successes / completed_runs, 0 when nothing has completed
    pub success_rate: f64,

    /// failures / completed_runs, 0 when nothing has completed
    pub error_rate: f64,

    /// total_attempts / completed_runs, 0 when nothing has completed
    pub average_attempts: f64,

    /// Mean elapsed-since-start across all recorded failed attempts
    pub average_duration: Duration,

    /// Most frequent error kind, first-seen order breaking ties, "none" when
    /// no errors have been recorded
    pub most_common_error: String,

    /// Externally reported quota usage fraction, 0 until reported
    pub quota_usage: f64,
}

impl RetryStats {
    /// Create an empty statistics sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failed-attempt record
    pub fn record_attempt(&self, record: AttemptRecord) {
        let mut inner = self.inner.write().expect("retry stats lock poisoned");
        inner.tally_error_kind(&record.error_kind);
        inner.attempts.push(record);
    }

    /// Append a run outcome record
    pub fn record_outcome(&self, record: OutcomeRecord) {
        let mut inner = self.inner.write().expect("retry stats lock poisoned");
        inner.outcomes.push(record);
    }

    /// Count a cancelled run
    ///
    /// Cancellations are tracked separately and do not affect the success
    /// rate.
    pub fn record_cancellation(&self) {
        let mut inner = self.inner.write().expect("retry stats lock poisoned");
        inner.cancellations += 1;
    }

    /// Report the current quota usage fraction
    ///
    /// The retry engine never produces this value; the embedding application
    /// feeds it so that quota monitoring can evaluate it alongside the retry
    /// metrics.
    pub fn record_quota_usage(&self, used_fraction: f64) {
        let mut inner = self.inner.write().expect("retry stats lock poisoned");
        inner.quota_usage = used_fraction;
    }

    /// Compute a point-in-time snapshot of all derived metrics
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.read().expect("retry stats lock poisoned");

        let successes = inner.outcomes.iter().filter(|o| o.succeeded).count() as u64;
        let failures = inner.outcomes.len() as u64 - successes;
        let completed_runs = successes + failures;
        let total_attempts: u64 = inner
            .outcomes
            .iter()
            .map(|o| u64::from(o.total_attempts))
            .sum();

        let (success_rate, error_rate, average_attempts) = if completed_runs == 0 {
            (0.0, 0.0, 0.0)
        } else {
            (
                successes as f64 / completed_runs as f64,
                failures as f64 / completed_runs as f64,
                total_attempts as f64 / completed_runs as f64,
            )
        };

        let average_duration = if inner.attempts.is_empty() {
            Duration::ZERO
        } else {
            let total_secs: f64 = inner
                .attempts
                .iter()
                .map(|a| a.elapsed_since_start.as_secs_f64())
                .sum();
            Duration::from_secs_f64(total_secs / inner.attempts.len() as f64)
        };

        StatsSnapshot {
            completed_runs,
            successes,
            failures,
            cancellations: inner.cancellations,
            total_attempts,
            success_rate,
            error_rate,
            average_attempts,
            average_duration,
            most_common_error: inner.most_common_error(),
            quota_usage: inner.quota_usage,
        }
    }

    /// Number of failed-attempt records accumulated so far
    pub fn attempt_count(&self) -> usize {
        self.inner
            .read()
            .expect("retry stats lock poisoned")
            .attempts
            .len()
    }

    /// Copy of the accumulated attempt records, in insertion order
    pub fn attempt_records(&self) -> Vec<AttemptRecord> {
        self.inner
            .read()
            .expect("retry stats lock poisoned")
            .attempts
            .clone()
    }
}

impl StatsInner {
    fn tally_error_kind(&mut self, kind: &str) {
        if let Some(entry) = self.error_kinds.iter_mut().find(|(k, _)| k == kind) {
            entry.1 += 1;
        } else {
            self.error_kinds.push((kind.to_string(), 1));
        }
    }

    fn most_common_error(&self) -> String {
        let mut best: Option<(&str, u64)> = None;
        for (kind, count) in &self.error_kinds {
            // Strict comparison keeps the first-seen kind on ties
            if best.map(|(_, c)| *count > c).unwrap_or(true) {
                best = Some((kind.as_str(), *count));
            }
        }
        best.map(|(kind, _)| kind.to_string())
            .unwrap_or_else(|| "none".to_string())
    }
}

impl RetryObserver for RetryStats {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, record: &AttemptRecord, _next_delay: Option<Duration>) {
        self.record_attempt(record.clone());
    }

    fn on_outcome(&self, record: &OutcomeRecord) {
        self.record_outcome(*record);
    }

    fn on_cancelled(&self, _attempts: u32, _elapsed: Duration) {
        self.record_cancellation();
    }
}
