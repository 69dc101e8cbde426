//! Slack push event dispatch handler.
//!
//! Receives channel messages via Socket Mode, filters out anything that is
//! not a fresh human-authored message, parses the text into a typed
//! command, and posts the rendered reply back to the same channel.

use std::sync::Arc;

use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector, SlackEventCallbackBody,
    SlackMessageEvent, SlackPushEventCallback,
};
use tracing::{error, warn};

use crate::slack::client::SlackMessage;
use crate::slack::commands;
use crate::slack::handlers::{self, AppState};

/// Handle push events delivered via Socket Mode.
///
/// Only plain channel messages are considered; edits, joins, and other
/// subtyped events, plus anything authored by a bot, are dropped silently.
///
/// # Errors
///
/// Returns an error if the event cannot be processed.
pub async fn handle_push_event(
    event: SlackPushEventCallback,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    state: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let SlackEventCallbackBody::Message(message) = event.event else {
        return Ok(());
    };

    let app_state: Option<Arc<AppState>> = {
        let guard = state.read().await;
        guard.get_user_state::<Arc<AppState>>().cloned()
    };
    let Some(app) = app_state else {
        warn!("app state not available; cannot process message");
        return Ok(());
    };

    let Some((channel_id, user, text)) = extract_command_message(&message) else {
        return Ok(());
    };

    let Some(parsed) = commands::parse(&text) else {
        return Ok(());
    };

    let reply = match parsed {
        Ok(command) => handlers::handle_command(&app, &channel_id, &user, command).await,
        Err(usage) => usage.usage(),
    };

    let outgoing = SlackMessage::plain(channel_id.clone().into(), reply);
    if let Err(err) = app.outbox.send(outgoing).await {
        error!(%channel_id, %err, "failed to enqueue command reply");
    }

    Ok(())
}

/// Pull `(channel, author handle, text)` out of a message event, or `None`
/// when the event is not a fresh human channel message.
fn extract_command_message(message: &SlackMessageEvent) -> Option<(String, String, String)> {
    if message.subtype.is_some() {
        return None;
    }
    if message.sender.bot_id.is_some() {
        return None;
    }

    let channel_id = message.origin.channel.as_ref()?.to_string();
    let user = message.sender.user.as_ref()?;
    let text = message.content.as_ref()?.text.clone()?;

    // Mention syntax so replies and listings render the author as a link.
    Some((channel_id, format!("<@{user}>"), text))
}
