//! Shared type definitions for brokkr-core

mod retry_config;

pub use retry_config::{RetryPoliciesConfig, RetryPolicy, RetryStrategy};
