//! services/bot/src/bot/callbacks.rs
//!
//! Handles presses of the inline buttons the bot attaches to its messages.
//! Every button belongs to the user whose command produced it.

use crate::bot::command::{parse_button, ButtonAction};
use crate::bot::messages;
use crate::bot::state::AppState;
use crate::bot::types::{CallbackQuery, Message};
use crate::error::BotError;
use streak_core::domain::{ChatInstance, MessageHandle};
use tracing::{debug, info};

pub async fn handle_callback(state: &AppState, query: &CallbackQuery) -> Result<(), BotError> {
    let button = query.data.as_deref().and_then(parse_button);
    let (Some(button), Some(message)) = (button, query.message.as_ref()) else {
        acknowledge(state, query, None).await;
        return Ok(());
    };

    if query.from.id != button.owner_id {
        acknowledge(state, query, Some(messages::NOT_FOR_YOU)).await;
        return Ok(());
    }

    match button.action {
        ButtonAction::Cancel => edit(state, message, &messages::cancelled()).await?,
        ButtonAction::Relapse => register_relapse(state, query, message).await?,
        ButtonAction::Remove => remove_all_data(state, query, message).await?,
        ButtonAction::Turn => turn_into_scoreboard(state, query, message).await,
    }
    acknowledge(state, query, None).await;
    Ok(())
}

/// Stops the client's loading spinner. Failures only cost a cosmetic glitch.
async fn acknowledge(state: &AppState, query: &CallbackQuery, text: Option<&str>) {
    if let Err(e) = state.chat.answer_callback_query(&query.id, text).await {
        debug!(callback_query_id = %query.id, "Could not answer callback query: {}", e);
    }
}

async fn edit(state: &AppState, message: &Message, text: &str) -> Result<(), BotError> {
    state
        .chat
        .edit_message_text(message.chat.id, message.message_id, text, None)
        .await?;
    Ok(())
}

async fn register_relapse(state: &AppState, query: &CallbackQuery, message: &Message) -> Result<(), BotError> {
    let Some(mut user) = state.db.get_user(query.from.id).await? else {
        return edit(state, message, messages::USE_STREAK_FIRST).await;
    };
    let lost = user.relapse(state.clock.now());
    state.db.save_streak(&user).await?;
    info!(user_id = user.user_id, lost_days = lost, attempt = user.attempts, "Relapse registered.");
    edit(state, message, &messages::relapse(lost, &query.from.full_name())).await
}

async fn remove_all_data(state: &AppState, query: &CallbackQuery, message: &Message) -> Result<(), BotError> {
    state.db.delete_user_data(query.from.id).await?;
    info!(user_id = query.from.id, "User erased all of their data.");
    edit(state, message, &messages::all_data_deleted()).await
}

/// Hands the message to the scoreboard service. The chat instance, not the
/// chat id, scopes the binding.
async fn turn_into_scoreboard(state: &AppState, query: &CallbackQuery, message: &Message) {
    let instance = ChatInstance(query.chat_instance.clone());
    let handle = MessageHandle {
        chat_id: message.chat.id,
        message_id: message.message_id,
    };
    info!(%instance, message = %handle, "Turning message into scoreboard.");
    state
        .scoreboards
        .turn_into_scoreboard(instance, handle, message.chat.id)
        .await;
}
