//! Retry execution engine with policy-based configuration
//!
//! This module provides a reusable, policy-based retry execution engine for
//! the document pipeline's network operations.
//!
//! # Features
//!
//! - Multiple backoff strategies: None, Fixed, Exponential, Linear
//! - Configurable jitter for computed delays
//! - Observable attempts and outcomes via the `RetryObserver` trait
//! - Built-in `TracingObserver` for logging
//! - Cooperative cancellation between attempts via `CancelToken`
//! - Builder pattern for flexible executor configuration
//! - Thread-safe with Send + Sync bounds
//!
//! # Example
//!
//! ```rust,no_run
//! use brokkr_core::retry::{retry_with_policy, RetryError};
//! use brokkr_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     let policy = RetryPolicy::default();
//!
//!     retry_with_policy(&policy, || async {
//!         // Your fallible operation here
//!         Ok("success".to_string())
//!     }).await
//! }
//! ```

mod cancel;
mod error;
mod executor;
mod observer;
mod strategies;

pub use cancel::CancelToken;
pub use error::{KindedError, RetryError};
pub use executor::{retry_with_policy, RetryExecutor, RetryExecutorBuilder};
pub use observer::{AttemptRecord, NoOpObserver, OutcomeRecord, RetryObserver, TracingObserver};
pub use strategies::calculate_delay;
