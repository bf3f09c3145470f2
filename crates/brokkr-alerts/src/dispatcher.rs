//! Alert dispatch and the bounded delivery-retry queue

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use brokkr_core::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};

use crate::alert::{Alert, Severity};
use crate::channels::{Channel, ChannelSender, DeliveryError};
use crate::preferences::{NotificationPreferences, PreferenceSource};
use crate::thresholds::AlertThresholds;

/// Retry configuration for failed channel deliveries
///
/// Queued deliveries back off linearly: the nth queue attempt waits
/// `n * retry-delay-ms` after the previous failure. This differs from the
/// exponential backoff used for operation retries; see DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeliveryRetryConfig {
    /// Queue attempts before a delivery is dropped
    #[serde(default = "default_delivery_attempts")]
    pub max_attempts: u32,

    /// Base delay between queue attempts in milliseconds
    #[serde(default = "default_delivery_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for DeliveryRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_delivery_attempts(),
            retry_delay_ms: default_delivery_delay_ms(),
        }
    }
}

fn default_delivery_attempts() -> u32 {
    3
}
fn default_delivery_delay_ms() -> u64 {
    5000 // 5 seconds
}

impl DeliveryRetryConfig {
    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// A failed delivery awaiting retry
///
/// Owned exclusively by the dispatcher's queue; removed when delivery
/// succeeds or `attempts_made` reaches the configured maximum.
#[derive(Debug, Clone)]
pub struct DeliveryTask {
    /// Channel the delivery failed on
    pub channel: Channel,

    /// The alert awaiting delivery
    pub alert: Alert,

    /// Queue attempts made so far
    pub attempts_made: u32,

    /// Earliest time of the next attempt
    pub next_attempt_at: Instant,
}

/// Builder for configuring an `AlertDispatcher`
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use brokkr_alerts::{
///     AlertDispatcherBuilder, AlertThresholds, Channel, NotificationPreferences,
/// };
/// # use brokkr_alerts::{Alert, ChannelSender, DeliveryError};
/// # struct SmtpSender;
/// # #[async_trait::async_trait]
/// # impl ChannelSender for SmtpSender {
/// #     async fn send(&self, _: &str, _: &Alert) -> Result<(), DeliveryError> { Ok(()) }
/// # }
///
/// let dispatcher = AlertDispatcherBuilder::new()
///     .with_thresholds(AlertThresholds::default())
///     .with_preferences(NotificationPreferences::default())
///     .with_sender(Channel::Email, Arc::new(SmtpSender))
///     .build();
/// ```
pub struct AlertDispatcherBuilder {
    thresholds: AlertThresholds,
    preferences: Arc<dyn PreferenceSource>,
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
    delivery: DeliveryRetryConfig,
}

impl Default for AlertDispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertDispatcherBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            thresholds: AlertThresholds::default(),
            preferences: Arc::new(NotificationPreferences::default()),
            senders: HashMap::new(),
            delivery: DeliveryRetryConfig::default(),
        }
    }

    /// Set the evaluation thresholds
    pub fn with_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the preference source consulted at dispatch time
    pub fn with_preferences(mut self, source: impl PreferenceSource + 'static) -> Self {
        self.preferences = Arc::new(source);
        self
    }

    /// Register a sender for a channel
    pub fn with_sender(mut self, channel: Channel, sender: Arc<dyn ChannelSender>) -> Self {
        self.senders.insert(channel, sender);
        self
    }

    /// Set the delivery-retry configuration
    pub fn with_delivery(mut self, delivery: DeliveryRetryConfig) -> Self {
        self.delivery = delivery;
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> AlertDispatcher {
        AlertDispatcher {
            thresholds: self.thresholds,
            preferences: self.preferences,
            senders: self.senders,
            delivery: self.delivery,
            queue: tokio::sync::Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
        }
    }
}

/// Evaluates statistics snapshots and fans alerts out to channels
///
/// `dispatch` never fails observably to its caller: delivery failures are
/// logged and queued for bounded retry, and deliveries that exhaust the
/// retry budget are dropped with a WARN log and not escalated further.
pub struct AlertDispatcher {
    thresholds: AlertThresholds,
    preferences: Arc<dyn PreferenceSource>,
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
    delivery: DeliveryRetryConfig,
    queue: tokio::sync::Mutex<Vec<DeliveryTask>>,
    history: Mutex<Vec<Alert>>,
}

impl AlertDispatcher {
    /// Evaluate a snapshot against the configured thresholds
    ///
    /// Pure function; nothing is recorded or delivered.
    pub fn evaluate(&self, snapshot: &StatsSnapshot) -> Vec<Alert> {
        self.thresholds.evaluate(snapshot)
    }

    /// Evaluate a snapshot and dispatch every resulting alert
    pub async fn monitor(&self, snapshot: &StatsSnapshot) {
        for alert in self.evaluate(snapshot) {
            self.dispatch(alert).await;
        }
    }

    /// Dispatch one alert to every channel its severity resolves to
    ///
    /// Resolves channels through the preference source, attempts delivery on
    /// each, and queues failed deliveries for retry. Channels without a
    /// registered sender are skipped.
    pub async fn dispatch(&self, alert: Alert) {
        self.log_alert(&alert);
        self.history
            .lock()
            .expect("alert history lock poisoned")
            .push(alert.clone());

        let prefs = self.preferences.preferences();
        let channels = prefs.channels_for(alert.severity);
        if channels.is_empty() {
            tracing::debug!(
                kind = %alert.kind,
                severity = %alert.severity,
                "no channels resolved for alert"
            );
            return;
        }

        for channel in channels {
            match self.try_deliver(&prefs, channel, &alert).await {
                Ok(()) => {
                    tracing::debug!(channel = %channel, kind = %alert.kind, "alert delivered");
                }
                Err(DeliveryError::NoSender { channel }) => {
                    tracing::debug!(channel = %channel, "no sender registered, skipping");
                }
                Err(err) => {
                    tracing::warn!(
                        channel = %channel,
                        kind = %alert.kind,
                        error = %err,
                        "alert delivery failed, queueing for retry"
                    );
                    let task = DeliveryTask {
                        channel,
                        alert: alert.clone(),
                        attempts_made: 0,
                        next_attempt_at: Instant::now() + self.delivery.retry_delay(),
                    };
                    self.queue.lock().await.push(task);
                }
            }
        }
    }

    /// Retry due queued deliveries once each
    ///
    /// Meant to be driven by an external periodic timer. The queue lock is
    /// held for the whole cycle, so cycles never overlap. A task failing its
    /// final attempt is dropped and logged; there is no further escalation.
    pub async fn process_queue(&self) {
        let mut queue = self.queue.lock().await;
        if queue.is_empty() {
            return;
        }

        let now = Instant::now();
        let prefs = self.preferences.preferences();
        let tasks = std::mem::take(&mut *queue);

        for mut task in tasks {
            if task.next_attempt_at > now {
                queue.push(task);
                continue;
            }

            task.attempts_made += 1;
            match self.try_deliver(&prefs, task.channel, &task.alert).await {
                Ok(()) => {
                    tracing::debug!(
                        channel = %task.channel,
                        kind = %task.alert.kind,
                        attempts = task.attempts_made,
                        "queued alert delivered"
                    );
                }
                Err(err) => {
                    if task.attempts_made >= self.delivery.max_attempts {
                        tracing::warn!(
                            channel = %task.channel,
                            kind = %task.alert.kind,
                            attempts = task.attempts_made,
                            error = %err,
                            "alert delivery abandoned"
                        );
                    } else {
                        task.next_attempt_at =
                            now + self.delivery.retry_delay() * task.attempts_made;
                        queue.push(task);
                    }
                }
            }
        }
    }

    /// Number of deliveries currently awaiting retry
    pub async fn pending_deliveries(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Copy of every alert dispatched so far, in dispatch order
    pub fn history(&self) -> Vec<Alert> {
        self.history
            .lock()
            .expect("alert history lock poisoned")
            .clone()
    }

    async fn try_deliver(
        &self,
        prefs: &NotificationPreferences,
        channel: Channel,
        alert: &Alert,
    ) -> Result<(), DeliveryError> {
        let Some(sender) = self.senders.get(&channel) else {
            return Err(DeliveryError::NoSender { channel });
        };
        let Some(destination) = prefs.destination(channel) else {
            return Err(DeliveryError::MissingDestination { channel });
        };
        sender.send(destination, alert).await
    }

    fn log_alert(&self, alert: &Alert) {
        match alert.severity {
            Severity::Critical | Severity::High => tracing::error!(
                kind = %alert.kind,
                severity = %alert.severity,
                message = %alert.message,
                "alert raised"
            ),
            Severity::Medium => tracing::warn!(
                kind = %alert.kind,
                severity = %alert.severity,
                message = %alert.message,
                "alert raised"
            ),
            Severity::Low => tracing::info!(
                kind = %alert.kind,
                severity = %alert.severity,
                message = %alert.message,
                "alert raised"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_retry_config_defaults() {
        let config = DeliveryRetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 5000);
        assert_eq!(config.retry_delay(), Duration::from_millis(5000));
    }

    #[test]
    fn test_delivery_retry_config_yaml() {
        let config: DeliveryRetryConfig =
            serde_yaml_ng::from_str("retry-delay-ms: 250").unwrap();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 250);
    }

    #[tokio::test]
    async fn test_builder_defaults() {
        let dispatcher = AlertDispatcherBuilder::new().build();
        assert_eq!(dispatcher.pending_deliveries().await, 0);
        assert!(dispatcher.history().is_empty());
    }
}
