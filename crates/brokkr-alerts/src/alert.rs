//! Alert records and severity tiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of alert raised over the retry statistics
///
/// `SecurityAlert` is never produced by a threshold rule; callers construct
/// it manually when they have something to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Error rate crossed its threshold
    ErrorSpike,

    /// Operations are averaging too many attempts
    HighRetryRate,

    /// Success rate dropped below its threshold
    SystemDegradation,

    /// Attempts are taking too long on average
    PerformanceAlert,

    /// Quota usage approaching its limit
    QuotaWarning,

    /// Manually raised security concern
    SecurityAlert,
}

impl AlertKind {
    /// Stable snake_case label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::ErrorSpike => "error_spike",
            AlertKind::HighRetryRate => "high_retry_rate",
            AlertKind::SystemDegradation => "system_degradation",
            AlertKind::PerformanceAlert => "performance_alert",
            AlertKind::QuotaWarning => "quota_warning",
            AlertKind::SecurityAlert => "security_alert",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert priority tier governing which notification channels are used
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Stable snake_case label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single alert raised by evaluation or constructed by a caller
///
/// Immutable once created. Its lifetime ends when it has been delivered on
/// every routed channel or dropped after the delivery-retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert ID (UUID v4)
    pub id: String,

    /// Alert category
    pub kind: AlertKind,

    /// Human-readable description
    pub message: String,

    /// Priority tier
    pub severity: Severity,

    /// Creation timestamp (UTC)
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Create a new alert stamped with the current time
    pub fn new(kind: AlertKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }

    /// Subject line for email delivery
    pub fn email_subject(&self) -> String {
        format!("Alert: {}", self.kind)
    }

    /// HTML body for email delivery
    pub fn email_body(&self) -> String {
        format!(
            "<h2>Alert: {}</h2>\n\
             <p><strong>Severity:</strong> {}</p>\n\
             <p><strong>Message:</strong> {}</p>\n\
             <p><strong>Time:</strong> {}</p>",
            self.kind,
            self.severity,
            self.message,
            self.created_at.to_rfc3339()
        )
    }

    /// Single-line text for SMS delivery
    pub fn sms_text(&self) -> String {
        format!("Alert [{}]: {}", self.severity, self.message)
    }
}
