//! Backoff delay calculation
//!
//! This module implements the delay strategies shared by the retry engine
//! and the alert delivery queue.

use crate::types::{RetryPolicy, RetryStrategy};
use rand::Rng;
use std::time::Duration;

/// Calculate the delay before the next attempt
///
/// # Arguments
///
/// * `policy` - The retry policy containing strategy and timing parameters
/// * `attempt` - The attempt number that just failed (1-indexed); the result
///   is the delay to wait before attempt `attempt + 1`
/// * `jitter` - Whether to apply random jitter to the delay
///
/// # Returns
///
/// The duration to wait before the next attempt
///
/// # Example
///
/// ```rust
/// use brokkr_core::retry::calculate_delay;
/// use brokkr_core::types::{RetryPolicy, RetryStrategy};
///
/// let policy = RetryPolicy {
///     max_attempts: 3,
///     strategy: RetryStrategy::ExponentialBackoff,
///     backoff_multiplier: 2.0,
///     initial_delay_ms: 1000,
///     max_delay_ms: 30000,
/// };
///
/// let delay = calculate_delay(&policy, 1, false);
/// assert_eq!(delay.as_millis(), 1000);
///
/// let delay = calculate_delay(&policy, 2, false);
/// assert_eq!(delay.as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32, jitter: bool) -> Duration {
    // Attempt is 1-indexed, but we want 0-indexed for calculations
    let attempt_index = attempt.saturating_sub(1);

    let base_delay_ms = match policy.strategy {
        RetryStrategy::None => 0,

        RetryStrategy::FixedDelay => policy.initial_delay_ms,

        RetryStrategy::ExponentialBackoff => {
            let multiplier = policy.backoff_multiplier.powf(attempt_index as f64);
            (policy.initial_delay_ms as f64 * multiplier) as u64
        }

        RetryStrategy::LinearBackoff => policy.initial_delay_ms * (attempt_index as u64 + 1),
    };

    // Apply max delay cap
    let capped_delay_ms = base_delay_ms.min(policy.max_delay_ms);

    // Apply jitter if requested (adds up to 25% random variation)
    let final_delay_ms = if jitter && capped_delay_ms > 0 {
        let jitter_range = capped_delay_ms / 4;
        let jitter_value = rand::rng().random_range(0..=jitter_range);
        capped_delay_ms + jitter_value
    } else {
        capped_delay_ms
    };

    Duration::from_millis(final_delay_ms)
}
