//! Task queue repository for `SQLite` persistence.
//!
//! Rows are keyed by `(channel_id, task_id)`; the monotonic `id` column
//! fixes insertion order for listing. Sequence numbers are never stored
//! here — callers rank the ordered listing at read time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::models::task::ReviewTask;
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for task and assignee records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TaskRow {
    channel_id: String,
    task_id: String,
    source_url: String,
    created_by: String,
    created_at: String,
}

impl TaskRow {
    /// Convert a database row plus its assignee set into the domain model.
    fn into_task(self, assignees: Vec<String>) -> Result<ReviewTask> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(ReviewTask {
            channel_id: self.channel_id,
            task_id: self.task_id,
            source_url: self.source_url,
            assignees,
            created_by: self.created_by,
            created_at,
        })
    }
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Whether `(channel_id, task_id)` already exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn exists(&self, channel_id: &str, task_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM task WHERE channel_id = ?1 AND task_id = ?2",
        )
        .bind(channel_id)
        .bind(task_id)
        .fetch_one(self.db.as_ref())
        .await?;
        Ok(count > 0)
    }

    /// Insert a task and its assignee set in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails; nothing is persisted
    /// in that case.
    pub async fn insert(&self, task: &ReviewTask) -> Result<()> {
        let created_at = task.created_at.to_rfc3339();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO task (channel_id, task_id, source_url, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&task.channel_id)
        .bind(&task.task_id)
        .bind(&task.source_url)
        .bind(&task.created_by)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        for handle in &task.assignees {
            sqlx::query(
                "INSERT INTO task_assignee (channel_id, task_id, handle) VALUES (?1, ?2, ?3)",
            )
            .bind(&task.channel_id)
            .bind(&task.task_id)
            .bind(handle)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fetch all tasks for a channel in insertion order, assignees attached.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list(&self, channel_id: &str) -> Result<Vec<ReviewTask>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT channel_id, task_id, source_url, created_by, created_at
             FROM task
             WHERE channel_id = ?1
             ORDER BY id ASC",
        )
        .bind(channel_id)
        .fetch_all(self.db.as_ref())
        .await?;

        let mut assignees = self.assignees_by_task(channel_id).await?;
        rows.into_iter()
            .map(|row| {
                let handles = assignees.remove(&row.task_id).unwrap_or_default();
                row.into_task(handles)
            })
            .collect()
    }

    /// Fetch one task by its canonical id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find(&self, channel_id: &str, task_id: &str) -> Result<Option<ReviewTask>> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT channel_id, task_id, source_url, created_by, created_at
             FROM task
             WHERE channel_id = ?1 AND task_id = ?2",
        )
        .bind(channel_id)
        .bind(task_id)
        .fetch_optional(self.db.as_ref())
        .await?;

        match row {
            Some(row) => {
                let handles = self.assignees_of(channel_id, task_id).await?;
                Ok(Some(row.into_task(handles)?))
            }
            None => Ok(None),
        }
    }

    /// Delete a task and its assignee set in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails.
    pub async fn delete(&self, channel_id: &str, task_id: &str) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM task_assignee WHERE channel_id = ?1 AND task_id = ?2")
            .bind(channel_id)
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM task WHERE channel_id = ?1 AND task_id = ?2")
            .bind(channel_id)
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Replace a task's entire assignee set in one transaction.
    ///
    /// An empty `handles` slice clears all assignees.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails; the previous set is
    /// kept intact in that case.
    pub async fn replace_assignees(
        &self,
        channel_id: &str,
        task_id: &str,
        handles: &[String],
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM task_assignee WHERE channel_id = ?1 AND task_id = ?2")
            .bind(channel_id)
            .bind(task_id)
            .execute(&mut *tx)
            .await?;
        for handle in handles {
            sqlx::query(
                "INSERT INTO task_assignee (channel_id, task_id, handle) VALUES (?1, ?2, ?3)",
            )
            .bind(channel_id)
            .bind(task_id)
            .bind(handle)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Whether the channel has any queued task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn has_any(&self, channel_id: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM task WHERE channel_id = ?1 LIMIT 1")
                .bind(channel_id)
                .fetch_one(self.db.as_ref())
                .await?;
        Ok(count > 0)
    }

    /// All assignees of a channel grouped by task id, handles sorted.
    async fn assignees_by_task(&self, channel_id: &str) -> Result<HashMap<String, Vec<String>>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT task_id, handle FROM task_assignee
             WHERE channel_id = ?1
             ORDER BY handle ASC",
        )
        .bind(channel_id)
        .fetch_all(self.db.as_ref())
        .await?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for (task_id, handle) in rows {
            grouped.entry(task_id).or_default().push(handle);
        }
        Ok(grouped)
    }

    /// Sorted assignee handles of one task.
    async fn assignees_of(&self, channel_id: &str, task_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT handle FROM task_assignee
             WHERE channel_id = ?1 AND task_id = ?2
             ORDER BY handle ASC",
        )
        .bind(channel_id)
        .bind(task_id)
        .fetch_all(self.db.as_ref())
        .await?;
        Ok(rows.into_iter().map(|(handle,)| handle).collect())
    }
}
