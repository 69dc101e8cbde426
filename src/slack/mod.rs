//! Slack bridge layer modules.

use slack_morphism::prelude::SlackChannelId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::scheduler::ReminderEvent;

pub mod client;
pub mod commands;
pub mod events;
pub mod handlers;
pub mod render;

use client::{Outbox, SlackMessage};

/// Spawn the consumer that turns scheduler events into channel messages.
///
/// Delivery failures are logged and swallowed; the next delivery attempt
/// for a channel is its next natural schedule match.
#[must_use]
pub fn spawn_reminder_delivery(
    mut event_rx: mpsc::Receiver<ReminderEvent>,
    outbox: Outbox,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = render::reminder_message(&event.tasks);
            let message = SlackMessage::plain(SlackChannelId(event.channel_id.clone()), text);
            if let Err(err) = outbox.send(message).await {
                error!(channel_id = %event.channel_id, %err, "reminder delivery failed");
            }
        }
        info!("reminder delivery task exiting");
    })
}
