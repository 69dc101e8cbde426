//! Review task model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One queued review request, identified within its channel by the
/// canonical task id derived from its source URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReviewTask {
    /// Owning channel; the isolation boundary for task identity.
    pub channel_id: String,
    /// Canonical id, `<repo>/merge_requests/<n>` or `<repo>/pull/<n>`.
    pub task_id: String,
    /// Original URL as submitted, preserved for link rendering.
    pub source_url: String,
    /// Assigned reviewer handles; sorted, deduplicated, possibly empty.
    pub assignees: Vec<String>,
    /// Handle of the submitter.
    pub created_by: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl ReviewTask {
    /// Construct a task stamped with the current time.
    ///
    /// The assignee list is normalized to set semantics: sorted and
    /// deduplicated.
    #[must_use]
    pub fn new(
        channel_id: String,
        task_id: String,
        source_url: String,
        assignees: Vec<String>,
        created_by: String,
    ) -> Self {
        Self {
            channel_id,
            task_id,
            source_url,
            assignees: normalize_assignees(assignees),
            created_by,
            created_at: Utc::now(),
        }
    }
}

/// A task paired with its live 1-based rank in the channel queue.
///
/// Sequence numbers are recomputed on every read and never stored; removing
/// the first task shifts every later task down by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTask {
    /// Current position in the queue, starting at 1.
    pub seq_no: usize,
    /// The task itself.
    pub task: ReviewTask,
}

/// Sort and deduplicate a list of reviewer handles.
#[must_use]
pub fn normalize_assignees(mut assignees: Vec<String>) -> Vec<String> {
    assignees.sort();
    assignees.dedup();
    assignees
}
