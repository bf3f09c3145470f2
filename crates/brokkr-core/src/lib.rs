//! # brokkr-core
//!
//! Core library for the Brokkr document pipeline providing:
//! - Retry execution engine with policy-based configuration
//! - Append-only retry statistics with derived snapshots
//! - Type definitions for retry policies and backoff strategies
//!
//! The retry engine reports every attempt and outcome through the
//! [`retry::RetryObserver`] seam; [`stats::RetryStats`] is the built-in
//! observer that aggregates those events and serves
//! [`stats::StatsSnapshot`]s to monitoring code.

pub mod retry;
pub mod stats;
pub mod types;

pub use retry::{
    retry_with_policy, CancelToken, KindedError, RetryError, RetryExecutor, RetryExecutorBuilder,
};
pub use stats::{RetryStats, StatsSnapshot};
pub use types::{RetryPoliciesConfig, RetryPolicy, RetryStrategy};
