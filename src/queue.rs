//! Per-channel review queue store.
//!
//! Wraps [`TaskRepo`] with the domain rules: canonical-id resolution on
//! add, per-channel uniqueness, live sequence renumbering on every read,
//! and reference resolution by sequence number or literal task id. Every
//! operation holds the owning channel's lock, so mutations on one channel
//! are serialized with each other and with the scheduler's pending check,
//! while distinct channels proceed in parallel.

use std::sync::Arc;

use crate::locks::ChannelLocks;
use crate::models::task::{normalize_assignees, QueuedTask, ReviewTask};
use crate::persistence::db::Database;
use crate::persistence::task_repo::TaskRepo;
use crate::{taskid, AppError, Result};

/// Queue store service over the task repository.
#[derive(Clone)]
pub struct QueueStore {
    repo: TaskRepo,
    locks: ChannelLocks,
}

impl QueueStore {
    /// Create a store over the given database and channel lock registry.
    #[must_use]
    pub fn new(db: Arc<Database>, locks: ChannelLocks) -> Self {
        Self {
            repo: TaskRepo::new(db),
            locks,
        }
    }

    /// Queue a review request.
    ///
    /// Resolves the canonical task id from `url`, rejects duplicates within
    /// the channel, and appends the task with the given assignee set (which
    /// may be empty).
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` / `AppError::UnsupportedHost` from id
    /// resolution, `AppError::DuplicateTask` when the request is already
    /// queued in this channel, and `AppError::Db` on persistence failure.
    pub async fn add(
        &self,
        channel_id: &str,
        url: &str,
        assignees: Vec<String>,
        submitter: &str,
    ) -> Result<QueuedTask> {
        let task_id = taskid::resolve(url)?;
        let _guard = self.locks.acquire(channel_id).await;

        if self.repo.exists(channel_id, &task_id).await? {
            return Err(AppError::DuplicateTask(format!(
                "{task_id} is already queued in this channel"
            )));
        }

        let task = ReviewTask::new(
            channel_id.to_owned(),
            task_id,
            url.to_owned(),
            assignees,
            submitter.to_owned(),
        );
        self.repo.insert(&task).await?;

        // The new task is last in insertion order.
        let seq_no = self.repo.list(channel_id).await?.len();
        Ok(QueuedTask { seq_no, task })
    }

    /// The channel's queue in insertion order with fresh sequence numbers.
    ///
    /// Each call produces a new listing; nothing is cached between calls.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on persistence failure.
    pub async fn list(&self, channel_id: &str) -> Result<Vec<QueuedTask>> {
        let _guard = self.locks.acquire(channel_id).await;
        let tasks = self.repo.list(channel_id).await?;
        Ok(rank(tasks))
    }

    /// Resolve a user-supplied reference into the task it names.
    ///
    /// A reference that parses as a positive integer (optionally
    /// `#`-prefixed) is a current sequence number; anything else is a
    /// literal task id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the sequence number is out of
    /// range or no task carries the literal id, and `AppError::Db` on
    /// persistence failure.
    pub async fn resolve_reference(&self, channel_id: &str, reference: &str) -> Result<QueuedTask> {
        let _guard = self.locks.acquire(channel_id).await;
        let tasks = self.repo.list(channel_id).await?;
        find_reference(tasks, reference)
    }

    /// Replace the referenced task's entire assignee set.
    ///
    /// An empty `assignees` list clears all assignees.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a bad reference and `AppError::Db`
    /// on persistence failure; the previous set survives a failed write.
    pub async fn assign(
        &self,
        channel_id: &str,
        reference: &str,
        assignees: Vec<String>,
    ) -> Result<QueuedTask> {
        let _guard = self.locks.acquire(channel_id).await;
        let tasks = self.repo.list(channel_id).await?;
        let mut queued = find_reference(tasks, reference)?;

        let assignees = normalize_assignees(assignees);
        self.repo
            .replace_assignees(channel_id, &queued.task.task_id, &assignees)
            .await?;
        queued.task.assignees = assignees;
        Ok(queued)
    }

    /// Remove the referenced task and its assignee set atomically.
    ///
    /// Returns the removed task (with the sequence number it held at
    /// removal time) for confirmation rendering. Removal is terminal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a bad reference and `AppError::Db`
    /// on persistence failure.
    pub async fn remove(&self, channel_id: &str, reference: &str) -> Result<QueuedTask> {
        let _guard = self.locks.acquire(channel_id).await;
        let tasks = self.repo.list(channel_id).await?;
        let queued = find_reference(tasks, reference)?;

        self.repo.delete(channel_id, &queued.task.task_id).await?;
        Ok(queued)
    }

    /// Whether the channel has pending tasks. Used by the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on persistence failure.
    pub async fn has_pending(&self, channel_id: &str) -> Result<bool> {
        let _guard = self.locks.acquire(channel_id).await;
        self.repo.has_any(channel_id).await
    }
}

/// Attach 1-based ranks to an insertion-ordered listing.
fn rank(tasks: Vec<ReviewTask>) -> Vec<QueuedTask> {
    tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| QueuedTask {
            seq_no: index + 1,
            task,
        })
        .collect()
}

/// Resolve a reference against an insertion-ordered listing.
fn find_reference(tasks: Vec<ReviewTask>, reference: &str) -> Result<QueuedTask> {
    let digits = reference.strip_prefix('#').unwrap_or(reference);

    if let Ok(seq_no) = digits.parse::<usize>() {
        if (1..=tasks.len()).contains(&seq_no) {
            let mut ranked = rank(tasks);
            return Ok(ranked.swap_remove(seq_no - 1));
        }
        return Err(AppError::NotFound(format!(
            "no task at position {reference}"
        )));
    }

    tasks
        .iter()
        .position(|task| task.task_id == reference)
        .map(|index| QueuedTask {
            seq_no: index + 1,
            task: tasks[index].clone(),
        })
        .ok_or_else(|| AppError::NotFound(format!("no task with id {reference}")))
}
