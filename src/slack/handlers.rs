//! Command dispatcher: typed commands in, rendered replies out.

use std::sync::Arc;

use chrono::Utc;

use crate::config::GlobalConfig;
use crate::cron::Schedule;
use crate::queue::QueueStore;
use crate::reminders::ReminderRegistry;
use crate::slack::client::Outbox;
use crate::slack::commands::Command;
use crate::slack::render;

/// Shared application state accessible by all event handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Per-channel review queues.
    pub queue: QueueStore,
    /// Per-channel reminder configurations.
    pub reminders: ReminderRegistry,
    /// Outbound message queue.
    pub outbox: Outbox,
}

/// Execute a command for `channel_id` on behalf of `user` and render the
/// reply.
///
/// Core failures are rendered as user-facing error text, never propagated;
/// a failed command reports its reason and nothing else.
pub async fn handle_command(
    state: &AppState,
    channel_id: &str,
    user: &str,
    command: Command,
) -> String {
    match command {
        Command::Add { url, assignees } => {
            match state.queue.add(channel_id, &url, assignees, user).await {
                Ok(queued) => render::added(&queued),
                Err(err) => render::error_reply(&err),
            }
        }
        Command::List => match state.queue.list(channel_id).await {
            Ok(tasks) => render::queue_listing(&tasks),
            Err(err) => render::error_reply(&err),
        },
        Command::Done { reference } => match state.queue.remove(channel_id, &reference).await {
            Ok(queued) => render::removed(&queued),
            Err(err) => render::error_reply(&err),
        },
        Command::Assign {
            reference,
            assignees,
        } => match state.queue.assign(channel_id, &reference, assignees).await {
            Ok(queued) => render::assigned(&queued),
            Err(err) => render::error_reply(&err),
        },
        Command::ReminderSet { expr } => match state.reminders.set(channel_id, &expr).await {
            Ok(config) => render::reminder_set(&config, next_fire(&config.schedule)),
            Err(err) => render::error_reply(&err),
        },
        Command::ReminderShow => match state.reminders.get(channel_id).await {
            Ok(config) => render::reminder_config(&config, next_fire(&config.schedule)),
            Err(err) => render::error_reply(&err),
        },
        Command::ReminderOff => match state.reminders.disable(channel_id).await {
            Ok(config) => render::reminder_config(&config, next_fire(&config.schedule)),
            Err(err) => render::error_reply(&err),
        },
        Command::ReminderRemove => match state.reminders.remove(channel_id).await {
            Ok(()) => "Reminder removed.".into(),
            Err(err) => render::error_reply(&err),
        },
        Command::Help => render::help(),
    }
}

/// Next fire time of a stored (already validated) schedule.
fn next_fire(schedule: &str) -> Option<chrono::DateTime<Utc>> {
    Schedule::parse(schedule)
        .ok()
        .and_then(|parsed| parsed.next_after(Utc::now()))
}
