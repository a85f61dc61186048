//! services/bot/src/bot/types.rs
//!
//! The subset of Telegram Bot API objects the bot reads and writes.

use serde::{Deserialize, Serialize};

//=========================================================================================
// Objects Received FROM Telegram
//=========================================================================================

#[derive(Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// The person who caused this update, if any.
    pub fn sender(&self) -> Option<&TelegramUser> {
        match (&self.callback_query, &self.message) {
            (Some(query), _) => Some(&query.from),
            (None, Some(message)) => message.from.as_ref(),
            (None, None) => None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl TelegramUser {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Telegram keeps deleted accounts around with an empty or placeholder name.
    pub fn is_deleted_account(&self) -> bool {
        self.first_name.is_empty() || self.first_name == "Deleted Account"
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i32,
    pub from: Option<TelegramUser>,
    pub chat: Chat,
    pub text: Option<String>,
}

impl Message {
    /// True in groups and supergroups; false in the private chat with the bot.
    pub fn is_group_chat(&self) -> bool {
        match &self.from {
            Some(from) => self.chat.id != from.id,
            None => self.chat.kind != "private",
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    pub message: Option<Message>,
    pub chat_instance: String,
    pub data: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatMember {
    pub status: String,
    pub user: TelegramUser,
    #[serde(default)]
    pub can_restrict_members: bool,
}

impl ChatMember {
    pub fn is_creator(&self) -> bool {
        self.status == "creator"
    }

    pub fn is_administrator(&self) -> bool {
        self.is_creator() || self.status == "administrator"
    }

    /// Creators, and administrators who may restrict members.
    pub fn can_moderate(&self) -> bool {
        self.is_creator() || (self.status == "administrator" && self.can_restrict_members)
    }
}

//=========================================================================================
// Objects Sent TO Telegram
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn single_row(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self {
            inline_keyboard: vec![buttons],
        }
    }
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Optional knobs for an outgoing message.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub reply_to: Option<i32>,
    pub markup: Option<InlineKeyboardMarkup>,
    pub disable_preview: bool,
}

impl SendOptions {
    pub fn reply_to(message_id: i32) -> Self {
        Self {
            reply_to: Some(message_id),
            ..Self::default()
        }
    }

    pub fn with_markup(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.markup = Some(markup);
        self
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_preview = true;
        self
    }
}
