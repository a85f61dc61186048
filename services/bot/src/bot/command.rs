//! services/bot/src/bot/command.rs
//!
//! Parses slash commands and the button payloads attached to bot messages.

/// The slash commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Streak,
    Relapse,
    Stats,
    SetStreak,
    EnableScoreboard,
    DeleteAllDataAboutMe,
    RemoveFromLeaderboard,
    ReturnToLeaderboard,
    Check,
    Autodelete,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "streak" => Self::Streak,
            "relapse" => Self::Relapse,
            "stats" => Self::Stats,
            "setstreak" => Self::SetStreak,
            "enablescoreboard" => Self::EnableScoreboard,
            "deletealldataaboutme" => Self::DeleteAllDataAboutMe,
            "removefromleaderboard" => Self::RemoveFromLeaderboard,
            "returntoleaderboard" => Self::ReturnToLeaderboard,
            "check" => Self::Check,
            "autodelete" => Self::Autodelete,
            _ => return None,
        };
        Some(command)
    }
}

/// A command together with its (trimmed, non-empty) argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub command: Command,
    pub args: Option<&'a str>,
}

/// Parses `/command[@bot] [args]`. Commands addressed to another bot are ignored.
pub fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<ParsedCommand<'a>> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, Some(args.trim())),
        None => (rest, None),
    };

    let name = match head.split_once('@') {
        Some((name, addressee)) => {
            if let Some(me) = bot_username {
                if !addressee.eq_ignore_ascii_case(me) {
                    return None;
                }
            }
            name
        }
        None => head,
    };

    Some(ParsedCommand {
        command: Command::from_name(name)?,
        args: args.filter(|a| !a.is_empty()),
    })
}

/// Who an admin command is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(i64),
    Username(String),
}

pub fn parse_target(arg: &str) -> Option<Target> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }
    if arg.chars().all(|c| c.is_ascii_digit()) {
        return arg.parse().ok().map(Target::Id);
    }
    let username = arg.trim_start_matches('@');
    if username.is_empty() {
        None
    } else {
        Some(Target::Username(username.to_string()))
    }
}

/// Upper bound accepted by `/setStreak`.
pub const MAX_SET_STREAK_DAYS: i64 = 100_000;

pub fn parse_streak_days(arg: &str) -> Option<i64> {
    let arg = arg.trim();
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    arg.parse::<i64>().ok().filter(|days| *days <= MAX_SET_STREAK_DAYS)
}

/// What an inline button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Turn,
    Relapse,
    Cancel,
    Remove,
}

impl ButtonAction {
    fn prefix(self) -> &'static str {
        match self {
            Self::Turn => "turn",
            Self::Relapse => "relapse",
            Self::Cancel => "cancel",
            Self::Remove => "remove",
        }
    }

    /// Payload for a button only `owner_id` may press.
    pub fn data(self, owner_id: i64) -> String {
        format!("{}_{}", self.prefix(), owner_id)
    }
}

/// A parsed button payload: the action and the user the button belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub action: ButtonAction,
    pub owner_id: i64,
}

pub fn parse_button(data: &str) -> Option<Button> {
    let (prefix, owner) = data.split_once('_')?;
    let action = match prefix {
        "turn" => ButtonAction::Turn,
        "relapse" => ButtonAction::Relapse,
        "cancel" => ButtonAction::Cancel,
        "remove" => ButtonAction::Remove,
        _ => return None,
    };
    Some(Button {
        action,
        owner_id: owner.parse().ok()?,
    })
}
