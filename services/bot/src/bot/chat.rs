//! services/bot/src/bot/chat.rs
//!
//! The chat operations the command handlers need. Implemented by the
//! Telegram adapter; replaced by an in-memory double in tests.

use crate::bot::types::{ChatMember, InlineKeyboardMarkup, Message, SendOptions};
use crate::error::TelegramError;
use async_trait::async_trait;

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<Message, TelegramError>;

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TelegramError>;

    /// Shows a toast to the user who pressed a button.
    async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>) -> Result<(), TelegramError>;

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember, TelegramError>;
}
