//! services/bot/src/bot/dispatcher.rs
//!
//! The long-polling loop and the routing of each update to its handler.
//! Every update runs in its own task so a slow handler never stalls polling.

use crate::adapters::TelegramClient;
use crate::bot::callbacks::handle_callback;
use crate::bot::command::parse_command;
use crate::bot::handlers::handle_command;
use crate::bot::state::{AppState, Incoming};
use crate::bot::sync::sync_sender;
use crate::bot::types::{Message, Update};
use crate::error::BotError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polls Telegram until `shutdown` is cancelled.
pub async fn run_polling(
    state: Arc<AppState>,
    telegram: Arc<TelegramClient>,
    poll_timeout_secs: u64,
    shutdown: CancellationToken,
) {
    info!("Polling for updates.");
    let mut offset = 0;

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = telegram.get_updates(offset, poll_timeout_secs) => result,
        };

        match result {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let state = state.clone();
                    tokio::spawn(async move {
                        process_update(&state, update).await;
                    });
                }
            }
            Err(e) => {
                warn!("Polling failed, retrying in {:?}: {}", POLL_RETRY_DELAY, e);
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                }
            }
        }
    }
    info!("Polling stopped.");
}

/// Syncs the sender's identity, then routes the update. Errors are logged,
/// never propagated.
pub async fn process_update(state: &AppState, update: Update) {
    sync_sender(state, &update).await;

    let result = if let Some(query) = &update.callback_query {
        handle_callback(state, query).await
    } else if let Some(message) = &update.message {
        handle_message(state, message).await
    } else {
        Ok(())
    };

    if let Err(e) = result {
        error!(update_id = update.update_id, "Failed to handle update: {}", e);
    }
}

async fn handle_message(state: &AppState, message: &Message) -> Result<(), BotError> {
    let (Some(text), Some(from)) = (message.text.as_deref(), message.from.as_ref()) else {
        return Ok(());
    };
    let Some(parsed) = parse_command(text, state.bot_username.as_deref()) else {
        return Ok(());
    };

    let autodelete = if message.is_group_chat() {
        state.db.get_or_create_group(message.chat.id).await?.autodelete
    } else {
        false
    };

    let incoming = Incoming {
        message,
        from,
        autodelete,
    };
    handle_command(state, &incoming, parsed).await
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
