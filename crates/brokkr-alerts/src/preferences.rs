//! User notification preferences and severity routing

use serde::{Deserialize, Serialize};

use crate::alert::Severity;
use crate::channels::Channel;

/// Per-user notification preferences
///
/// Controls which channels each severity tier may use and carries the
/// destination for each channel. Medium and low alerts only ever go to
/// email, and each needs its own opt-in on top of the channel flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotificationPreferences {
    /// Whether email delivery is enabled at all
    #[serde(default = "default_true")]
    pub email_enabled: bool,

    /// Whether SMS delivery is enabled at all
    #[serde(default = "default_true")]
    pub sms_enabled: bool,

    /// Whether Slack delivery is enabled at all
    #[serde(default)]
    pub slack_enabled: bool,

    /// Opt-in for medium-severity email
    #[serde(default = "default_true")]
    pub email_medium_priority: bool,

    /// Opt-in for low-severity email
    #[serde(default)]
    pub email_low_priority: bool,

    /// Email destination address
    #[serde(default)]
    pub email_address: String,

    /// SMS destination number
    #[serde(default)]
    pub sms_number: String,

    /// Slack destination channel
    #[serde(default = "default_slack_channel")]
    pub slack_channel: String,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_enabled: default_true(),
            sms_enabled: default_true(),
            slack_enabled: false,
            email_medium_priority: default_true(),
            email_low_priority: false,
            email_address: String::new(),
            sms_number: String::new(),
            slack_channel: default_slack_channel(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_slack_channel() -> String {
    "#alerts".to_string()
}

impl NotificationPreferences {
    /// Resolve the channels an alert of the given severity should use
    ///
    /// The push channel is never routed; it exists for senders registered by
    /// embedding applications that address it directly.
    pub fn channels_for(&self, severity: Severity) -> Vec<Channel> {
        let mut channels = Vec::new();

        match severity {
            Severity::Critical => {
                if self.sms_enabled {
                    channels.push(Channel::Sms);
                }
                if self.email_enabled {
                    channels.push(Channel::Email);
                }
                if self.slack_enabled {
                    channels.push(Channel::Slack);
                }
            }
            Severity::High => {
                if self.email_enabled {
                    channels.push(Channel::Email);
                }
                if self.slack_enabled {
                    channels.push(Channel::Slack);
                }
            }
            Severity::Medium => {
                if self.email_enabled && self.email_medium_priority {
                    channels.push(Channel::Email);
                }
            }
            Severity::Low => {
                if self.email_enabled && self.email_low_priority {
                    channels.push(Channel::Email);
                }
            }
        }

        channels
    }

    /// Destination for a channel, `None` when not configured
    pub fn destination(&self, channel: Channel) -> Option<&str> {
        let destination = match channel {
            Channel::Email => self.email_address.as_str(),
            Channel::Sms => self.sms_number.as_str(),
            Channel::Slack => self.slack_channel.as_str(),
            Channel::Push => "",
        };

        if destination.is_empty() {
            None
        } else {
            Some(destination)
        }
    }
}

/// Source of notification preferences, read at dispatch time
///
/// The dispatcher reads preferences synchronously on every dispatch, so a
/// live source (settings store, remote cache) can change routing without
/// rebuilding the dispatcher. A plain `NotificationPreferences` value acts
/// as a fixed source.
pub trait PreferenceSource: Send + Sync {
    /// Current preferences
    fn preferences(&self) -> NotificationPreferences;
}

impl PreferenceSource for NotificationPreferences {
    fn preferences(&self) -> NotificationPreferences {
        self.clone()
    }
}
