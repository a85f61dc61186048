//! services/bot/src/bot/state.rs
//!
//! Defines the application's shared state and the per-message context.

use crate::bot::chat::ChatApi;
use crate::bot::types::{Message, TelegramUser};
use crate::config::Config;
use std::sync::Arc;
use streak_core::ports::{Clock, StreakRepository};
use streak_core::ScoreboardService;

//=========================================================================================
// AppState (Shared Across All Updates)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn StreakRepository>,
    pub chat: Arc<dyn ChatApi>,
    pub scoreboards: ScoreboardService,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
    /// The bot's own username, used to ignore commands meant for other bots.
    pub bot_username: Option<String>,
}

//=========================================================================================
// Incoming (Specific to One Command Message)
//=========================================================================================

/// A command message together with what the dispatcher learned about it.
pub struct Incoming<'a> {
    pub message: &'a Message,
    pub from: &'a TelegramUser,
    /// Whether bot replies in this chat should be deleted after a delay.
    pub autodelete: bool,
}

impl Incoming<'_> {
    pub fn chat_id(&self) -> i64 {
        self.message.chat.id
    }

    pub fn in_group(&self) -> bool {
        self.message.is_group_chat()
    }
}
