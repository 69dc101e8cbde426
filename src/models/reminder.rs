//! Reminder configuration model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A channel's reminder schedule plus enabled flag.
///
/// At most one configuration exists per channel. Disabling keeps the
/// schedule on record; only an explicit remove deletes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReminderConfig {
    /// Channel the reminder fires into.
    pub channel_id: String,
    /// Validated 5-field cron expression, stored as submitted.
    pub schedule: String,
    /// Whether the scheduler considers this configuration.
    pub enabled: bool,
    /// First configuration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last set/disable timestamp.
    pub updated_at: DateTime<Utc>,
}
