//! services/bot/src/adapters/telegram.rs
//!
//! This module contains the adapter for the Telegram Bot API. It implements
//! the `MessagingService` port from the `core` crate and the `ChatApi` used
//! by the command handlers.

use crate::bot::chat::ChatApi;
use crate::bot::types::{ChatMember, InlineKeyboardMarkup, Message, SendOptions, TelegramUser, Update};
use crate::error::TelegramError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use streak_core::domain::MessageHandle;
use streak_core::ports::{MessagingService, PushError, PushOutcome};

const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Headroom on top of the long-poll timeout before the HTTP call gives up.
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 15;
const PARSE_MODE_HTML: &str = "HTML";

//=========================================================================================
// Wire Envelope and Request Bodies
//=========================================================================================

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i32>,
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct ReplyParameters {
    message_id: i32,
    allow_sending_without_reply: bool,
}

#[derive(Serialize)]
struct LinkPreviewOptions {
    is_disabled: bool,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_parameters: Option<ReplyParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_preview_options: Option<LinkPreviewOptions>,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: i64,
    message_id: i32,
    text: &'a str,
    parse_mode: &'a str,
    link_preview_options: LinkPreviewOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct MessageRef {
    chat_id: i64,
    message_id: i32,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct GetChatMember {
    chat_id: i64,
    user_id: i64,
}

#[derive(Serialize)]
struct DeleteWebhook {
    drop_pending_updates: bool,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that talks to the Telegram Bot API over HTTPS.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    /// Creates a new `TelegramClient` for the bot identified by `token`.
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + REQUEST_TIMEOUT_MARGIN_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TelegramError::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TelegramError::Http(e.to_string()))?;
        parse_response(status, &text)
    }

    /// Long-polls for updates newer than `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &body).await
    }

    /// The bot's own account.
    pub async fn get_me(&self) -> Result<TelegramUser, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), TelegramError> {
        let _: bool = self
            .call("deleteWebhook", &DeleteWebhook { drop_pending_updates })
            .await?;
        Ok(())
    }
}

/// Unwraps the `{ok, result}` envelope. Telegram reports most failures as a
/// JSON body with `ok: false`, whatever the HTTP status.
fn parse_response<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, TelegramError> {
    let envelope: ApiResponse<T> = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) if status == 200 => return Err(TelegramError::Decode(e.to_string())),
        Err(_) => {
            return Err(TelegramError::Api {
                code: i32::from(status),
                description: text.to_string(),
            })
        }
    };

    if envelope.ok {
        envelope
            .result
            .ok_or_else(|| TelegramError::Decode("missing result".to_string()))
    } else {
        Err(TelegramError::Api {
            code: envelope.error_code.unwrap_or(i32::from(status)),
            description: envelope.description.unwrap_or_default(),
        })
    }
}

/// Maps a failed `editMessageText` onto the scoreboard push outcomes.
pub fn classify_edit_error(error: TelegramError) -> Result<PushOutcome, PushError> {
    match error {
        TelegramError::Api { description, .. } if description.contains("message is not modified") => {
            Ok(PushOutcome::Unchanged)
        }
        TelegramError::Api { code: 403, description } => Err(PushError::Unrenderable(description)),
        TelegramError::Api { code: 400, description } if is_gone(&description) => {
            Err(PushError::Unrenderable(description))
        }
        other => Err(PushError::Transient(other.to_string())),
    }
}

fn is_gone(description: &str) -> bool {
    const GONE: [&str; 5] = [
        "message to edit not found",
        "message can't be edited",
        "MESSAGE_ID_INVALID",
        "chat not found",
        "have no rights to send a message",
    ];
    GONE.iter().any(|marker| description.contains(marker))
}

//=========================================================================================
// `ChatApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<Message, TelegramError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: PARSE_MODE_HTML,
            reply_parameters: options.reply_to.map(|message_id| ReplyParameters {
                message_id,
                allow_sending_without_reply: true,
            }),
            reply_markup: options.markup,
            link_preview_options: options
                .disable_preview
                .then_some(LinkPreviewOptions { is_disabled: true }),
        };
        self.call("sendMessage", &body).await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let body = EditMessageText {
            chat_id,
            message_id,
            text,
            parse_mode: PARSE_MODE_HTML,
            link_preview_options: LinkPreviewOptions { is_disabled: true },
            reply_markup: markup,
        };
        // The result is the edited message, or `true` for inline messages.
        let _: serde_json::Value = self.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TelegramError> {
        let _: bool = self.call("deleteMessage", &MessageRef { chat_id, message_id }).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>) -> Result<(), TelegramError> {
        let _: bool = self
            .call("answerCallbackQuery", &AnswerCallbackQuery { callback_query_id, text })
            .await?;
        Ok(())
    }

    async fn get_chat_member(&self, chat_id: i64, user_id: i64) -> Result<ChatMember, TelegramError> {
        self.call("getChatMember", &GetChatMember { chat_id, user_id }).await
    }
}

//=========================================================================================
// `MessagingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl MessagingService for TelegramClient {
    async fn push_update(&self, message: &MessageHandle, text: &str) -> Result<PushOutcome, PushError> {
        match self
            .edit_message_text(message.chat_id, message.message_id, text, None)
            .await
        {
            Ok(()) => Ok(PushOutcome::Updated),
            Err(e) => classify_edit_error(e),
        }
    }
}
