//! Per-channel reminder configuration registry.
//!
//! Validates cron expressions before they are persisted and applies the
//! same per-channel serialization as the queue store. Configurations are
//! durable: they survive restarts and are only discarded by an explicit
//! remove.

use std::sync::Arc;

use crate::cron::Schedule;
use crate::locks::ChannelLocks;
use crate::models::reminder::ReminderConfig;
use crate::persistence::db::Database;
use crate::persistence::reminder_repo::ReminderRepo;
use crate::{AppError, Result};

/// Reminder registry service over the reminder repository.
#[derive(Clone)]
pub struct ReminderRegistry {
    repo: ReminderRepo,
    locks: ChannelLocks,
}

impl ReminderRegistry {
    /// Create a registry over the given database and channel lock registry.
    #[must_use]
    pub fn new(db: Arc<Database>, locks: ChannelLocks) -> Self {
        Self {
            repo: ReminderRepo::new(db),
            locks,
        }
    }

    /// Set (or overwrite) the channel's schedule and enable it.
    ///
    /// Calling `set` on a disabled channel re-enables it with the new
    /// schedule.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidCronSyntax` / `AppError::InvalidCronField`
    /// when the expression does not validate, and `AppError::Db` on
    /// persistence failure.
    pub async fn set(&self, channel_id: &str, expr: &str) -> Result<ReminderConfig> {
        Schedule::parse(expr)?;
        let _guard = self.locks.acquire(channel_id).await;
        self.repo.upsert(channel_id, expr).await
    }

    /// Fetch the channel's configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the channel has no configuration
    /// and `AppError::Db` on persistence failure.
    pub async fn get(&self, channel_id: &str) -> Result<ReminderConfig> {
        self.repo
            .get(channel_id)
            .await?
            .ok_or_else(|| AppError::NotFound("no reminder configured for this channel".into()))
    }

    /// Disable the channel's reminder, keeping its schedule on record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the channel has no configuration
    /// and `AppError::Db` on persistence failure.
    pub async fn disable(&self, channel_id: &str) -> Result<ReminderConfig> {
        let _guard = self.locks.acquire(channel_id).await;
        if !self.repo.set_enabled(channel_id, false).await? {
            return Err(AppError::NotFound(
                "no reminder configured for this channel".into(),
            ));
        }
        self.repo
            .get(channel_id)
            .await?
            .ok_or_else(|| AppError::Db("reminder missing after disable".into()))
    }

    /// Delete the channel's configuration entirely.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the channel has no configuration
    /// and `AppError::Db` on persistence failure.
    pub async fn remove(&self, channel_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(channel_id).await;
        if !self.repo.delete(channel_id).await? {
            return Err(AppError::NotFound(
                "no reminder configured for this channel".into(),
            ));
        }
        Ok(())
    }

    /// All enabled configurations, for scheduler evaluation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on persistence failure.
    pub async fn list_enabled(&self) -> Result<Vec<ReminderConfig>> {
        self.repo.list_enabled().await
    }
}
