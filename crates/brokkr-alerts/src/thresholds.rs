//! Threshold rules over retry statistics snapshots

use brokkr_core::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::alert::{Alert, AlertKind, Severity};

/// Threshold configuration for snapshot evaluation
///
/// Each field is compared against the corresponding snapshot metric; every
/// breach produces one alert per evaluation. Repeated breaches across
/// successive evaluations each produce a fresh alert; deduplication, if
/// wanted, is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlertThresholds {
    /// Error rate above which an error spike is raised
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// Average attempts per operation above which a high retry rate is raised
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: f64,

    /// Average attempt duration in milliseconds above which a performance
    /// alert is raised
    #[serde(default = "default_response_time_ms")]
    pub response_time_ms: u64,

    /// Success rate below which system degradation is raised
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    /// Quota usage fraction above which a quota warning is raised
    #[serde(default = "default_quota_usage")]
    pub quota_usage: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate: default_error_rate(),
            retry_attempts: default_retry_attempts(),
            response_time_ms: default_response_time_ms(),
            success_rate: default_success_rate(),
            quota_usage: default_quota_usage(),
        }
    }
}

fn default_error_rate() -> f64 {
    0.2 // 20% error rate
}
fn default_retry_attempts() -> f64 {
    3.0
}
fn default_response_time_ms() -> u64 {
    5000 // 5 seconds
}
fn default_success_rate() -> f64 {
    0.7 // 70% success rate
}
fn default_quota_usage() -> f64 {
    0.8 // 80% of quota
}

impl AlertThresholds {
    /// Evaluate a snapshot against every rule
    ///
    /// Pure function of the snapshot and thresholds; no state is kept
    /// between calls.
    pub fn evaluate(&self, snapshot: &StatsSnapshot) -> Vec<Alert> {
        let mut alerts = Vec::new();

        // 1. Error rate
        if snapshot.error_rate > self.error_rate {
            alerts.push(Alert::new(
                AlertKind::ErrorSpike,
                Severity::High,
                format!(
                    "High error rate detected: {:.1}%",
                    snapshot.error_rate * 100.0
                ),
            ));
        }

        // 2. Retry rate
        if snapshot.average_attempts > self.retry_attempts {
            alerts.push(Alert::new(
                AlertKind::HighRetryRate,
                Severity::Medium,
                format!(
                    "Excessive retry attempts: {:.1} attempts/operation",
                    snapshot.average_attempts
                ),
            ));
        }

        // 3. Performance
        if snapshot.average_duration > Duration::from_millis(self.response_time_ms) {
            alerts.push(Alert::new(
                AlertKind::PerformanceAlert,
                Severity::Medium,
                format!(
                    "Slow response times: {:.1}s average",
                    snapshot.average_duration.as_secs_f64()
                ),
            ));
        }

        // 4. System health
        if snapshot.success_rate < self.success_rate {
            alerts.push(Alert::new(
                AlertKind::SystemDegradation,
                Severity::High,
                format!(
                    "Low success rate: {:.1}%",
                    snapshot.success_rate * 100.0
                ),
            ));
        }

        // 5. Quota
        if snapshot.quota_usage > self.quota_usage {
            alerts.push(Alert::new(
                AlertKind::QuotaWarning,
                Severity::Medium,
                format!(
                    "API quota nearly exceeded: {:.1}% used",
                    snapshot.quota_usage * 100.0
                ),
            ));
        }

        alerts
    }
}
