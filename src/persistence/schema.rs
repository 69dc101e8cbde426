//! `SQLite` schema bootstrap and legacy migration logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every server startup. Produces a convergent result.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// Creates all three tables idempotently. Safe to call on every startup.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS task (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id  TEXT NOT NULL,
    task_id     TEXT NOT NULL,
    source_url  TEXT NOT NULL,
    created_by  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE(channel_id, task_id)
);

CREATE TABLE IF NOT EXISTS task_assignee (
    channel_id  TEXT NOT NULL,
    task_id     TEXT NOT NULL,
    handle      TEXT NOT NULL,
    PRIMARY KEY (channel_id, task_id, handle)
);

CREATE TABLE IF NOT EXISTS reminder (
    channel_id  TEXT PRIMARY KEY NOT NULL,
    schedule    TEXT NOT NULL,
    enabled     INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_task_channel ON task(channel_id);
CREATE INDEX IF NOT EXISTS idx_assignee_task ON task_assignee(channel_id, task_id);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}

/// Convert a legacy single-assignee `task.assigned_to` column into the
/// `task_assignee` relation.
///
/// Older deployments stored exactly one reviewer directly on the task row.
/// When that column is still present and `task_assignee` has never been
/// populated, every non-empty, non-`unassigned` value is copied over as the
/// sole initial member of the task's assignee set. Re-running is a no-op.
///
/// # Errors
///
/// Returns `AppError::Db` if inspection or the copy fails.
pub async fn migrate_legacy_assignees(pool: &SqlitePool) -> Result<()> {
    let columns: Vec<SqliteRow> = sqlx::query("PRAGMA table_info(task)")
        .fetch_all(pool)
        .await?;
    let has_legacy_column = columns
        .iter()
        .any(|row| row.get::<String, _>("name") == "assigned_to");
    if !has_legacy_column {
        return Ok(());
    }

    let populated: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_assignee")
        .fetch_one(pool)
        .await?;
    if populated > 0 {
        return Ok(());
    }

    sqlx::query(
        "INSERT OR IGNORE INTO task_assignee (channel_id, task_id, handle)
         SELECT channel_id, task_id, assigned_to FROM task
         WHERE assigned_to IS NOT NULL
           AND assigned_to != ''
           AND assigned_to != 'unassigned'",
    )
    .execute(pool)
    .await?;

    tracing::info!("migrated legacy single-assignee column into task_assignee");
    Ok(())
}
