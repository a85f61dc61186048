//! In-memory doubles for the database and Telegram, plus update builders.

use crate::bot::chat::ChatApi;
use crate::bot::state::AppState;
use crate::bot::types::{CallbackQuery, Chat, ChatMember, InlineKeyboardMarkup, Message, SendOptions, TelegramUser, Update};
use crate::config::Config;
use crate::error::TelegramError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use streak_core::domain::{ChatInstance, Group, GroupMember, GroupMembership, MessageHandle, User};
use streak_core::ports::{
    Clock, MemberDirectory, MessagingService, PortError, PortResult, PushError, PushOutcome, StreakRepository,
};
use streak_core::{RankQuery, ScoreboardRegistry, ScoreboardService};

pub(crate) const GROUP_ID: i64 = -100_200;
pub(crate) const SCOREBOARD_INTERVAL: Duration = Duration::from_secs(180);
pub(crate) const AUTODELETE_DELAY: Duration = Duration::from_secs(20);

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

//=========================================================================================
// Database Double
//=========================================================================================

#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Mutex<HashMap<i64, User>>,
    memberships: Mutex<HashMap<(i64, i64), bool>>,
    groups: Mutex<HashMap<i64, bool>>,
}

impl MemoryStore {
    pub(crate) fn user(&self, user_id: i64) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    pub(crate) fn insert_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.user_id, user);
    }

    pub(crate) fn is_banned(&self, user_id: i64, group_id: i64) -> Option<bool> {
        self.memberships.lock().unwrap().get(&(user_id, group_id)).copied()
    }
}

#[async_trait]
impl StreakRepository for MemoryStore {
    async fn get_user(&self, user_id: i64) -> PortResult<Option<User>> {
        Ok(self.user(user_id))
    }

    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|user| {
                user.username
                    .as_deref()
                    .is_some_and(|stored| stored.eq_ignore_ascii_case(username))
            })
            .cloned())
    }

    async fn create_user(&self, user: &User) -> PortResult<()> {
        self.insert_user(user.clone());
        Ok(())
    }

    async fn save_streak(&self, user: &User) -> PortResult<()> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(&user.user_id)
            .ok_or_else(|| PortError::NotFound(format!("user {}", user.user_id)))?;
        stored.streak_start = user.streak_start;
        stored.attempts = user.attempts;
        stored.maximum_days = user.maximum_days;
        stored.all_days = user.all_days;
        Ok(())
    }

    async fn sync_identity(&self, user_id: i64, name: &str, username: Option<&str>) -> PortResult<bool> {
        let mut users = self.users.lock().unwrap();
        let Some(stored) = users.get_mut(&user_id) else {
            return Ok(false);
        };
        if stored.name == name && stored.username.as_deref() == username {
            return Ok(false);
        }
        stored.name = name.to_string();
        stored.username = username.map(str::to_string);
        Ok(true)
    }

    async fn delete_user_data(&self, user_id: i64) -> PortResult<()> {
        self.users.lock().unwrap().remove(&user_id);
        self.memberships.lock().unwrap().retain(|(user, _), _| *user != user_id);
        Ok(())
    }

    async fn get_membership(&self, user_id: i64, group_id: i64) -> PortResult<Option<GroupMembership>> {
        Ok(self.is_banned(user_id, group_id).map(|is_banned| GroupMembership {
            user_id,
            group_id,
            is_banned,
        }))
    }

    async fn add_membership(&self, user_id: i64, group_id: i64) -> PortResult<()> {
        self.memberships.lock().unwrap().entry((user_id, group_id)).or_insert(false);
        Ok(())
    }

    async fn set_banned(&self, user_id: i64, group_id: i64, is_banned: bool) -> PortResult<()> {
        match self.memberships.lock().unwrap().get_mut(&(user_id, group_id)) {
            Some(flag) => {
                *flag = is_banned;
                Ok(())
            }
            None => Err(PortError::NotFound(format!("membership {user_id}/{group_id}"))),
        }
    }

    async fn get_or_create_group(&self, group_id: i64) -> PortResult<Group> {
        let autodelete = *self.groups.lock().unwrap().entry(group_id).or_insert(false);
        Ok(Group { group_id, autodelete })
    }

    async fn set_autodelete(&self, group_id: i64, autodelete: bool) -> PortResult<()> {
        self.groups.lock().unwrap().insert(group_id, autodelete);
        Ok(())
    }
}

#[async_trait]
impl MemberDirectory for MemoryStore {
    async fn query_group_members(&self, group_id: i64) -> PortResult<Vec<GroupMember>> {
        let users = self.users.lock().unwrap();
        let memberships = self.memberships.lock().unwrap();
        let mut members: Vec<GroupMember> = memberships
            .iter()
            .filter(|((_, group), _)| *group == group_id)
            .filter_map(|((user_id, _), is_banned)| {
                users.get(user_id).map(|user| GroupMember {
                    user_id: user.user_id,
                    display_name: user.name.clone(),
                    handle: user.username.clone(),
                    streak_start: user.streak_start,
                    is_banned: *is_banned,
                })
            })
            .collect();
        members.sort_by_key(|m| (m.streak_start, m.user_id));
        Ok(members)
    }
}

//=========================================================================================
// Telegram Double
//=========================================================================================

#[derive(Debug, Clone)]
pub(crate) struct Sent {
    pub chat_id: i64,
    pub message_id: i32,
    pub text: String,
    pub options: SendOptions,
}

#[derive(Default)]
pub(crate) struct MockChat {
    next_message_id: AtomicI32,
    sent: Mutex<Vec<Sent>>,
    edits: Mutex<Vec<(i64, i32, String)>>,
    deleted: Mutex<Vec<(i64, i32)>>,
    answers: Mutex<Vec<(String, Option<String>)>>,
    members: Mutex<HashMap<i64, ChatMember>>,
    pushes: Mutex<Vec<(MessageHandle, String)>>,
}

impl MockChat {
    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn last_text(&self) -> String {
        self.sent.lock().unwrap().last().map(|s| s.text.clone()).unwrap_or_default()
    }

    pub(crate) fn edits(&self) -> Vec<(i64, i32, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<(i64, i32)> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn answers(&self) -> Vec<(String, Option<String>)> {
        self.answers.lock().unwrap().clone()
    }

    pub(crate) fn pushes(&self) -> Vec<(MessageHandle, String)> {
        self.pushes.lock().unwrap().clone()
    }

    /// Makes `get_chat_member` report `status` for `user`.
    pub(crate) fn set_member(&self, user: TelegramUser, status: &str, can_restrict_members: bool) {
        self.members.lock().unwrap().insert(
            user.id,
            ChatMember {
                status: status.to_string(),
                user,
                can_restrict_members,
            },
        );
    }
}

#[async_trait]
impl ChatApi for MockChat {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<Message, TelegramError> {
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1000;
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            message_id,
            text: text.to_string(),
            options,
        });
        Ok(Message {
            message_id,
            from: None,
            chat: Chat {
                id: chat_id,
                kind: if chat_id < 0 { "supergroup" } else { "private" }.to_string(),
            },
            text: Some(text.to_string()),
        })
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        _markup: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        self.edits.lock().unwrap().push((chat_id, message_id, text.to_string()));
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<(), TelegramError> {
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>) -> Result<(), TelegramError> {
        self.answers
            .lock()
            .unwrap()
            .push((callback_query_id.to_string(), text.map(str::to_string)));
        Ok(())
    }

    async fn get_chat_member(&self, _chat_id: i64, user_id: i64) -> Result<ChatMember, TelegramError> {
        self.members
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| TelegramError::Api {
                code: 400,
                description: "Bad Request: user not found".to_string(),
            })
    }
}

#[async_trait]
impl MessagingService for MockChat {
    async fn push_update(&self, message: &MessageHandle, text: &str) -> Result<PushOutcome, PushError> {
        self.pushes.lock().unwrap().push((*message, text.to_string()));
        Ok(PushOutcome::Updated)
    }
}

//=========================================================================================
// Application Wiring
//=========================================================================================

pub(crate) fn test_config() -> Config {
    Config {
        telegram_token: "123:abc".to_string(),
        telegram_api_url: "http://localhost".to_string(),
        database_url: "postgres://localhost/test".to_string(),
        db_max_connections: 1,
        log_level: tracing::Level::INFO,
        scoreboard_interval: SCOREBOARD_INTERVAL,
        autodelete_delay: AUTODELETE_DELAY,
        poll_timeout_secs: 1,
        base_repo: "https://example.org/repo".to_string(),
        show_base_repo_in_help: false,
    }
}

pub(crate) struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub chat: Arc<MockChat>,
}

pub(crate) fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let chat = Arc::new(MockChat::default());
    let clock = Arc::new(FixedClock(now()));
    let scoreboards = ScoreboardService::new(
        Arc::new(ScoreboardRegistry::new()),
        RankQuery::new(store.clone(), clock.clone()),
        chat.clone(),
        SCOREBOARD_INTERVAL,
    );
    let state = AppState {
        db: store.clone(),
        chat: chat.clone(),
        scoreboards,
        clock,
        config: Arc::new(test_config()),
        bot_username: Some("streak_bot".to_string()),
    };
    TestApp { state, store, chat }
}

//=========================================================================================
// Update Builders
//=========================================================================================

static NEXT_UPDATE_ID: AtomicI64 = AtomicI64::new(1);

pub(crate) fn tg_user(id: i64, first_name: &str, username: Option<&str>) -> TelegramUser {
    TelegramUser {
        id,
        is_bot: false,
        first_name: first_name.to_string(),
        last_name: None,
        username: username.map(str::to_string),
    }
}

fn message_in(chat_id: i64, message_id: i32, from: Option<TelegramUser>, text: Option<&str>) -> Message {
    Message {
        message_id,
        from,
        chat: Chat {
            id: chat_id,
            kind: if chat_id < 0 { "supergroup" } else { "private" }.to_string(),
        },
        text: text.map(str::to_string),
    }
}

fn update_id() -> i64 {
    NEXT_UPDATE_ID.fetch_add(1, Ordering::SeqCst)
}

/// A command typed in the sender's private chat with the bot.
pub(crate) fn private_command(from: &TelegramUser, text: &str) -> Update {
    Update {
        update_id: update_id(),
        message: Some(message_in(from.id, 1, Some(from.clone()), Some(text))),
        callback_query: None,
    }
}

pub(crate) fn group_command(from: &TelegramUser, chat_id: i64, text: &str) -> Update {
    Update {
        update_id: update_id(),
        message: Some(message_in(chat_id, 1, Some(from.clone()), Some(text))),
        callback_query: None,
    }
}

/// The chat instance Telegram reports for button presses in `chat_id`.
pub(crate) fn instance(chat_id: i64) -> ChatInstance {
    ChatInstance(format!("instance{chat_id}"))
}

/// A button press on `message_id` in `chat_id`.
pub(crate) fn button_press(from: &TelegramUser, chat_id: i64, message_id: i32, data: &str) -> Update {
    Update {
        update_id: update_id(),
        message: None,
        callback_query: Some(CallbackQuery {
            id: format!("cb-{}", update_id()),
            from: from.clone(),
            message: Some(message_in(chat_id, message_id, None, None)),
            chat_instance: instance(chat_id).0,
            data: Some(data.to_string()),
        }),
    }
}
