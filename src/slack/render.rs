//! Reply and reminder message rendering (Slack mrkdwn).
//!
//! All user-facing text is produced here; the core returns data and typed
//! errors only.

use chrono::{DateTime, Utc};

use crate::models::reminder::ReminderConfig;
use crate::models::task::QueuedTask;
use crate::AppError;

/// One queue line: rank, linked task id, assignees, submitter.
#[must_use]
pub fn task_line(queued: &QueuedTask) -> String {
    let task = &queued.task;
    let link = format!("<{}|{}>", task.source_url, task.task_id);
    if task.assignees.is_empty() {
        format!(
            "[#{}] {} (by {})",
            queued.seq_no, link, task.created_by
        )
    } else {
        format!(
            "[#{}] {} → {} (by {})",
            queued.seq_no,
            link,
            task.assignees.join(" "),
            task.created_by
        )
    }
}

/// The full queue listing, or a placeholder when empty.
#[must_use]
pub fn queue_listing(tasks: &[QueuedTask]) -> String {
    if tasks.is_empty() {
        return "No tasks in the queue.".into();
    }
    tasks
        .iter()
        .map(task_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scheduled reminder message: header plus the current listing.
#[must_use]
pub fn reminder_message(tasks: &[QueuedTask]) -> String {
    let mut lines = vec!["*:clipboard: Reminder: pending reviews*".to_owned()];
    lines.extend(tasks.iter().map(task_line));
    lines.join("\n")
}

/// Confirmation for a freshly queued task.
#[must_use]
pub fn added(queued: &QueuedTask) -> String {
    task_line(queued)
}

/// Confirmation for a removed task.
#[must_use]
pub fn removed(queued: &QueuedTask) -> String {
    let task = &queued.task;
    format!(
        "Removed <{}|{}> (added by {})",
        task.source_url, task.task_id, task.created_by
    )
}

/// Confirmation for a replaced assignee set.
#[must_use]
pub fn assigned(queued: &QueuedTask) -> String {
    let task = &queued.task;
    if task.assignees.is_empty() {
        format!("[#{}] {} now has no assignees", queued.seq_no, task.task_id)
    } else {
        format!(
            "[#{}] {} → {}",
            queued.seq_no,
            task.task_id,
            task.assignees.join(" ")
        )
    }
}

/// Reminder configuration summary with the next fire time.
#[must_use]
pub fn reminder_config(config: &ReminderConfig, next: Option<DateTime<Utc>>) -> String {
    let state = if config.enabled { "enabled" } else { "off" };
    let next = match next {
        Some(t) if config.enabled => format!("next: {} UTC", t.format("%Y-%m-%d %H:%M")),
        Some(_) => "next: — (disabled)".into(),
        None => "next: never".into(),
    };
    format!("Reminder `{}` ({state}, {next})", config.schedule)
}

/// Confirmation for a newly set schedule.
#[must_use]
pub fn reminder_set(config: &ReminderConfig, next: Option<DateTime<Utc>>) -> String {
    match next {
        Some(t) => format!(
            "Reminder set to `{}`; next: {} UTC",
            config.schedule,
            t.format("%Y-%m-%d %H:%M")
        ),
        None => format!(
            "Reminder set to `{}`; that schedule never fires",
            config.schedule
        ),
    }
}

/// User-facing text for a typed core failure.
#[must_use]
pub fn error_reply(err: &AppError) -> String {
    match err {
        AppError::InvalidUrl(_) | AppError::UnsupportedHost(_) => {
            "Invalid URL. Provide a GitLab merge request or GitHub pull request link, e.g.\n\
             • `http://gitlab.example.com/group/repo/-/merge_requests/123`\n\
             • `https://github.com/owner/repo/pull/123`"
                .into()
        }
        AppError::DuplicateTask(msg)
        | AppError::NotFound(msg)
        | AppError::InvalidCronSyntax(msg)
        | AppError::InvalidCronField(msg) => msg.clone(),
        _ => "Something went wrong; try again.".into(),
    }
}

/// Usage summary for `!whelp`.
#[must_use]
pub fn help() -> String {
    "*Work Queue Commands*\n\
     `!wadd <URL> [@handle ...]` — queue a merge/pull request\n\
     `!w` — list the queue\n\
     `!wdone <N | #N | task_id>` — remove a finished request\n\
     `!wassign <ref> <@handle ...>` — replace assignees\n\
     `!wreminder set <cron>` — remind this channel on a schedule (UTC)\n\
     `!wreminder` — show the schedule\n\
     `!wreminder off` — pause reminders\n\
     `!wreminder remove` — delete the schedule\n\
     \n\
     *Supported URLs:* GitLab `.../-/merge_requests/N`, GitHub `github.com/owner/repo/pull/N`"
        .into()
}
