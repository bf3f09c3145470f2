//! Notification channels and the delivery seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::alert::Alert;

/// A notification delivery medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Push,
    Slack,
}

impl Channel {
    /// Stable snake_case label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Push => "push",
            Channel::Slack => "slack",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by channel delivery
///
/// These never reach the alert producer; the dispatcher catches them, logs,
/// and queues the delivery for bounded retry.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The channel transport refused or failed the delivery
    #[error("{channel} delivery rejected: {reason}")]
    Rejected { channel: Channel, reason: String },

    /// Preferences carry no destination for this channel
    #[error("no destination configured for {channel}")]
    MissingDestination { channel: Channel },

    /// No sender has been registered for this channel
    #[error("no sender registered for {channel}")]
    NoSender { channel: Channel },
}

/// External collaborator that performs the actual delivery
///
/// Implementations resolve on accepted-for-delivery and reject on failure.
/// The dispatcher only decides whether and when to call them.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Deliver one alert to one destination
    async fn send(&self, destination: &str, alert: &Alert) -> Result<(), DeliveryError>;
}
