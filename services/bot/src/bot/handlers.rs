//! services/bot/src/bot/handlers.rs
//!
//! One handler per slash command.

use crate::bot::command::{parse_streak_days, parse_target, ButtonAction, Command, ParsedCommand, Target};
use crate::bot::messages;
use crate::bot::state::{AppState, Incoming};
use crate::bot::types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, SendOptions};
use crate::error::BotError;
use streak_core::domain::User;
use streak_core::ports::PortError;
use tracing::{debug, info, warn};

pub async fn handle_command(
    state: &AppState,
    incoming: &Incoming<'_>,
    parsed: ParsedCommand<'_>,
) -> Result<(), BotError> {
    debug!(command = ?parsed.command, chat_id = incoming.chat_id(), user_id = incoming.from.id, "Handling command.");
    match parsed.command {
        Command::Start => start(state, incoming).await,
        Command::Help => help(state, incoming).await,
        Command::Streak => streak(state, incoming).await,
        Command::Relapse => relapse(state, incoming).await,
        Command::Stats => stats(state, incoming).await,
        Command::SetStreak => set_streak(state, incoming, parsed.args).await,
        Command::EnableScoreboard => enable_scoreboard(state, incoming).await,
        Command::DeleteAllDataAboutMe => delete_all_data(state, incoming).await,
        Command::RemoveFromLeaderboard => set_ban(state, incoming, parsed.args, true).await,
        Command::ReturnToLeaderboard => set_ban(state, incoming, parsed.args, false).await,
        Command::Check => check(state, incoming, parsed.args).await,
        Command::Autodelete => autodelete(state, incoming, parsed.args).await,
    }
}

//=========================================================================================
// Reply Helpers
//=========================================================================================

/// Replies to the command message; the reply is auto-deleted when the group asks for it.
async fn reply(state: &AppState, incoming: &Incoming<'_>, text: &str) -> Result<(), BotError> {
    send(state, incoming, text, SendOptions::reply_to(incoming.message.message_id)).await
}

/// Posts into the chat without quoting the command.
async fn answer(state: &AppState, incoming: &Incoming<'_>, text: &str) -> Result<(), BotError> {
    send(state, incoming, text, SendOptions::default()).await
}

async fn send(state: &AppState, incoming: &Incoming<'_>, text: &str, options: SendOptions) -> Result<(), BotError> {
    let sent = state.chat.send_message(incoming.chat_id(), text, options).await?;
    schedule_autodelete(state, incoming, &sent);
    Ok(())
}

fn schedule_autodelete(state: &AppState, incoming: &Incoming<'_>, sent: &Message) {
    if !(incoming.autodelete && incoming.in_group()) {
        return;
    }
    let chat = state.chat.clone();
    let delay = state.config.autodelete_delay;
    let (chat_id, message_id) = (sent.chat.id, sent.message_id);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = chat.delete_message(chat_id, message_id).await {
            debug!(chat_id, message_id, "Autodelete failed: {}", e);
        }
    });
}

fn confirmation(yes: ButtonAction, owner_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_row(vec![
        InlineKeyboardButton::new("Yes", yes.data(owner_id)),
        InlineKeyboardButton::new("No", ButtonAction::Cancel.data(owner_id)),
    ])
}

//=========================================================================================
// Personal Commands
//=========================================================================================

async fn start(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    answer(state, incoming, &messages::start(&incoming.from.full_name())).await
}

async fn help(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    let repo = state
        .config
        .show_base_repo_in_help
        .then_some(state.config.base_repo.as_str());
    let options = SendOptions::reply_to(incoming.message.message_id).without_preview();
    send(state, incoming, &messages::help(repo), options).await
}

async fn streak(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    let now = state.clock.now();
    match state.db.get_user(incoming.from.id).await? {
        Some(user) => {
            let text = messages::current_streak(&incoming.from.full_name(), user.current_days(now));
            answer(state, incoming, &text).await
        }
        None => {
            let user = User::new(
                incoming.from.id,
                incoming.from.full_name(),
                incoming.from.username.clone(),
                now,
            );
            state.db.create_user(&user).await?;
            info!(user_id = user.user_id, "Streak started for new user.");
            reply(state, incoming, &messages::streak_started()).await
        }
    }
}

async fn stats(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    let Some(user) = state.db.get_user(incoming.from.id).await? else {
        return reply(state, incoming, messages::USE_STREAK_FIRST).await;
    };
    let now = state.clock.now();
    let text = messages::stats(
        &incoming.from.full_name(),
        user.total_days(now),
        user.maximum_days,
        i64::from(user.attempts),
        user.current_days(now),
    );
    reply(state, incoming, &text).await
}

async fn relapse(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    if state.db.get_user(incoming.from.id).await?.is_none() {
        return reply(state, incoming, messages::NO_STREAK_TO_RELAPSE).await;
    }
    let options = SendOptions::reply_to(incoming.message.message_id)
        .with_markup(confirmation(ButtonAction::Relapse, incoming.from.id));
    send(state, incoming, &messages::confirm_relapse(), options).await
}

async fn set_streak(state: &AppState, incoming: &Incoming<'_>, args: Option<&str>) -> Result<(), BotError> {
    let Some(days) = args.and_then(parse_streak_days) else {
        return reply(state, incoming, &messages::set_streak_usage()).await;
    };
    let Some(mut user) = state.db.get_user(incoming.from.id).await? else {
        return answer(state, incoming, messages::USE_STREAK_FIRST).await;
    };
    user.set_streak_days(days, state.clock.now());
    state.db.save_streak(&user).await?;
    answer(state, incoming, &messages::streak_set(days)).await
}

async fn delete_all_data(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    if state.db.get_user(incoming.from.id).await?.is_none() {
        return reply(state, incoming, &messages::nothing_to_delete()).await;
    }
    let options = SendOptions::reply_to(incoming.message.message_id)
        .with_markup(confirmation(ButtonAction::Remove, incoming.from.id));
    send(state, incoming, &messages::confirm_delete_all(), options).await
}

//=========================================================================================
// Group Commands
//=========================================================================================

async fn enable_scoreboard(state: &AppState, incoming: &Incoming<'_>) -> Result<(), BotError> {
    if !incoming.in_group() {
        return reply(state, incoming, &messages::scoreboard_private_chat()).await;
    }
    if state.db.get_user(incoming.from.id).await?.is_none() {
        return reply(state, incoming, messages::USE_STREAK_FIRST).await;
    }

    let text = match state.db.get_membership(incoming.from.id, incoming.chat_id()).await? {
        Some(_) => messages::scoreboard_already_enabled(),
        None => {
            state.db.add_membership(incoming.from.id, incoming.chat_id()).await?;
            info!(user_id = incoming.from.id, group_id = incoming.chat_id(), "User joined scoreboard.");
            messages::scoreboard_enabled()
        }
    };

    // Never autodeleted: this message is meant to become the scoreboard.
    let markup = InlineKeyboardMarkup::single_row(vec![InlineKeyboardButton::new(
        messages::TURN_INTO_SCOREBOARD,
        ButtonAction::Turn.data(incoming.from.id),
    )]);
    state
        .chat
        .send_message(
            incoming.chat_id(),
            &text,
            SendOptions::reply_to(incoming.message.message_id).with_markup(markup),
        )
        .await?;
    Ok(())
}

/// Which admins may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminLevel {
    /// The creator, or administrators allowed to restrict members.
    Moderator,
    /// The creator or any administrator.
    Administrator,
}

/// Replies with the reason and returns `false` when the sender lacks rights.
async fn ensure_admin(state: &AppState, incoming: &Incoming<'_>, level: AdminLevel) -> Result<bool, BotError> {
    let member = match state.chat.get_chat_member(incoming.chat_id(), incoming.from.id).await {
        Ok(member) => member,
        Err(e) => {
            warn!(chat_id = incoming.chat_id(), "Could not fetch chat member: {}", e);
            reply(state, incoming, messages::ADMINS_UNAVAILABLE).await?;
            return Ok(false);
        }
    };

    let (allowed, refusal) = match level {
        AdminLevel::Moderator => (member.can_moderate(), messages::ADMIN_ONLY_RESTRICT),
        AdminLevel::Administrator => (member.is_administrator(), messages::ADMIN_ONLY),
    };
    if !allowed {
        reply(state, incoming, refusal).await?;
    }
    Ok(allowed)
}

/// Resolves a target to a user id. Usernames must belong to a known user;
/// with `require_known`, numeric ids must too.
async fn resolve_target(state: &AppState, target: Target, require_known: bool) -> Result<Option<i64>, BotError> {
    match target {
        Target::Username(username) => Ok(state
            .db
            .find_user_by_username(&username)
            .await?
            .map(|user| user.user_id)),
        Target::Id(user_id) if require_known => Ok(state.db.get_user(user_id).await?.map(|user| user.user_id)),
        Target::Id(user_id) => Ok(Some(user_id)),
    }
}

async fn set_ban(state: &AppState, incoming: &Incoming<'_>, args: Option<&str>, is_banned: bool) -> Result<(), BotError> {
    if !incoming.in_group() {
        return reply(state, incoming, messages::GROUPS_ONLY).await;
    }
    let Some(target) = args.and_then(parse_target) else {
        let usage = if is_banned {
            messages::target_usage("removeFromLeaderboard", "Deletes an account from scoreboard (admins only)")
        } else {
            messages::target_usage(
                "returnToLeaderboard",
                "Returns an account to scoreboard if it's banned (admins only)",
            )
        };
        return reply(state, incoming, &usage).await;
    };
    if !ensure_admin(state, incoming, AdminLevel::Moderator).await? {
        return Ok(());
    }
    let Some(user_id) = resolve_target(state, target, false).await? else {
        return reply(state, incoming, messages::NEVER_USED_ME).await;
    };

    match state.db.set_banned(user_id, incoming.chat_id(), is_banned).await {
        Ok(()) => {
            info!(user_id, group_id = incoming.chat_id(), is_banned, "Scoreboard ban updated.");
            let text = if is_banned {
                messages::removed_from_scoreboard(user_id)
            } else {
                messages::returned_to_scoreboard(user_id)
            };
            answer(state, incoming, &text).await
        }
        Err(PortError::NotFound(_)) => reply(state, incoming, &messages::not_on_scoreboard(user_id)).await,
        Err(e) => Err(e.into()),
    }
}

async fn check(state: &AppState, incoming: &Incoming<'_>, args: Option<&str>) -> Result<(), BotError> {
    let Some(target) = args.and_then(parse_target) else {
        let usage = messages::target_usage("check", "Deletes an account from scoreboard if it's been deleted");
        return reply(state, incoming, &usage).await;
    };
    let Some(user_id) = resolve_target(state, target, true).await? else {
        return reply(state, incoming, messages::NEVER_USED_ME).await;
    };

    let member = match state.chat.get_chat_member(incoming.chat_id(), user_id).await {
        Ok(member) => member,
        Err(e) => {
            warn!(user_id, "Check lookup failed: {}", e);
            return reply(state, incoming, &messages::check_query_failed()).await;
        }
    };
    if !member.user.is_deleted_account() {
        return reply(state, incoming, &messages::check_user_alive()).await;
    }

    state.db.delete_user_data(user_id).await?;
    info!(user_id, "Removed deleted Telegram account.");
    answer(state, incoming, &messages::check_user_removed(user_id)).await
}

async fn autodelete(state: &AppState, incoming: &Incoming<'_>, args: Option<&str>) -> Result<(), BotError> {
    if !incoming.in_group() {
        return reply(state, incoming, messages::GROUPS_ONLY).await;
    }
    let enabled = match args.map(str::to_ascii_lowercase).as_deref() {
        Some("on") => true,
        Some("off") => false,
        _ => return reply(state, incoming, &messages::autodelete_usage()).await,
    };
    if !ensure_admin(state, incoming, AdminLevel::Administrator).await? {
        return Ok(());
    }
    state.db.set_autodelete(incoming.chat_id(), enabled).await?;
    info!(group_id = incoming.chat_id(), enabled, "Autodelete toggled.");
    answer(state, incoming, &messages::autodelete_set(enabled)).await
}
