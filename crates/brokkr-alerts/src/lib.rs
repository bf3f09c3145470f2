//! # brokkr-alerts
//!
//! Alerting layer for the Brokkr document pipeline providing:
//! - Threshold evaluation over retry statistics snapshots
//! - Alert records with severity tiers
//! - Severity-based notification channel routing via user preferences
//! - A bounded retry queue for failed channel deliveries
//!
//! The dispatcher never surfaces delivery failures to the alert producer;
//! failed deliveries are retried on a linear backoff up to a fixed budget
//! and then dropped with a WARN log. Actual channel transport lives behind
//! the [`ChannelSender`] trait and is supplied by the embedding application.

mod alert;
mod channels;
mod dispatcher;
mod preferences;
mod thresholds;

pub use alert::{Alert, AlertKind, Severity};
pub use channels::{Channel, ChannelSender, DeliveryError};
pub use dispatcher::{
    AlertDispatcher, AlertDispatcherBuilder, DeliveryRetryConfig, DeliveryTask,
};
pub use preferences::{NotificationPreferences, PreferenceSource};
pub use thresholds::AlertThresholds;
