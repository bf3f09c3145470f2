//! Snapshot and preference fixtures shared by the dispatcher tests

use std::time::Duration;

use brokkr_alerts::NotificationPreferences;
use brokkr_core::stats::StatsSnapshot;

/// Preferences with every channel enabled and destinations filled in
pub fn full_preferences() -> NotificationPreferences {
    NotificationPreferences {
        email_enabled: true,
        sms_enabled: true,
        slack_enabled: true,
        email_medium_priority: true,
        email_low_priority: true,
        email_address: "ops@example.com".to_string(),
        sms_number: "+15550100".to_string(),
        slack_channel: "#alerts".to_string(),
    }
}

/// Snapshot with every metric inside its threshold
pub fn healthy_snapshot() -> StatsSnapshot {
    StatsSnapshot {
        completed_runs: 10,
        successes: 9,
        failures: 1,
        cancellations: 0,
        total_attempts: 10,
        success_rate: 0.9,
        error_rate: 0.1,
        average_attempts: 1.0,
        average_duration: Duration::from_millis(1000),
        most_common_error: "timed_out".to_string(),
        quota_usage: 0.5,
    }
}
