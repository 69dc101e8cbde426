//! Reminder configuration repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::Utc;

use crate::models::reminder::ReminderConfig;
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for reminder configurations.
#[derive(Clone)]
pub struct ReminderRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ReminderRow {
    channel_id: String,
    schedule: String,
    enabled: i64,
    created_at: String,
    updated_at: String,
}

impl ReminderRow {
    fn into_config(self) -> Result<ReminderConfig> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);
        let updated_at = chrono::DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| AppError::Db(format!("invalid updated_at: {e}")))?
            .with_timezone(&Utc);

        Ok(ReminderConfig {
            channel_id: self.channel_id,
            schedule: self.schedule,
            enabled: self.enabled != 0,
            created_at,
            updated_at,
        })
    }
}

impl ReminderRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or overwrite the channel's configuration with
    /// `enabled = true`, preserving the original `created_at` on overwrite.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the upsert fails.
    pub async fn upsert(&self, channel_id: &str, schedule: &str) -> Result<ReminderConfig> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO reminder (channel_id, schedule, enabled, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT(channel_id) DO UPDATE SET
                 schedule = excluded.schedule,
                 enabled = 1,
                 updated_at = excluded.updated_at",
        )
        .bind(channel_id)
        .bind(schedule)
        .bind(&now)
        .execute(self.db.as_ref())
        .await?;

        self.get(channel_id)
            .await?
            .ok_or_else(|| AppError::Db("reminder missing after upsert".into()))
    }

    /// Fetch the channel's configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get(&self, channel_id: &str) -> Result<Option<ReminderConfig>> {
        let row: Option<ReminderRow> = sqlx::query_as(
            "SELECT channel_id, schedule, enabled, created_at, updated_at
             FROM reminder
             WHERE channel_id = ?1",
        )
        .bind(channel_id)
        .fetch_optional(self.db.as_ref())
        .await?;

        row.map(ReminderRow::into_config).transpose()
    }

    /// Flip the enabled flag without touching the schedule.
    ///
    /// Returns `false` when no configuration exists for the channel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn set_enabled(&self, channel_id: &str, enabled: bool) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE reminder SET enabled = ?2, updated_at = ?3 WHERE channel_id = ?1",
        )
        .bind(channel_id)
        .bind(i64::from(enabled))
        .bind(&now)
        .execute(self.db.as_ref())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the channel's configuration entirely.
    ///
    /// Returns `false` when no configuration existed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete(&self, channel_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reminder WHERE channel_id = ?1")
            .bind(channel_id)
            .execute(self.db.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All enabled configurations, for scheduler evaluation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_enabled(&self) -> Result<Vec<ReminderConfig>> {
        let rows: Vec<ReminderRow> = sqlx::query_as(
            "SELECT channel_id, schedule, enabled, created_at, updated_at
             FROM reminder
             WHERE enabled = 1
             ORDER BY channel_id ASC",
        )
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(ReminderRow::into_config).collect()
    }
}
