//! services/bot/src/bot/messages.rs
//!
//! Text templates for everything the bot says. All output is Telegram HTML.

use streak_core::render::{day_unit, escape_html};

pub const TICK: &str = "✅";
pub const CROSS: &str = "❌";
pub const FIRE: &str = "🔥";
pub const FORBIDDEN: &str = "🚫";
pub const BIN: &str = "🗑";
pub const OK: &str = "🆗";

pub const TURN_INTO_SCOREBOARD: &str = "Turn this message into a scoreboard";
pub const NOT_FOR_YOU: &str = "🚫 This button was not meant for you";
pub const USE_STREAK_FIRST: &str = "↪️ Use /streak to start a new streak.";
pub const NO_STREAK_TO_RELAPSE: &str = "To start a streak, write /streak";
pub const NEVER_USED_ME: &str = "This user never used me";
pub const GROUPS_ONLY: &str = "❌ This command works only in groups.";
pub const ADMINS_UNAVAILABLE: &str = "I can't get chat admins! Please report this error to the support group.";
pub const ADMIN_ONLY_RESTRICT: &str = "This command is admin-only (with ability to restrict members)!";
pub const ADMIN_ONLY: &str = "This command is admin-only!";

/// "1st", "2nd", "3rd", "4th", "11th", "21st", ...
pub fn ordinal(n: i64) -> String {
    let suffix = if (4..=20).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{n}{suffix}")
}

pub fn start(name: &str) -> String {
    format!("Hello, <b>{}!</b>. To start a streak, write /streak", escape_html(name))
}

pub fn streak_started() -> String {
    "Streak has been started! You have 0 days!".to_string()
}

pub fn current_streak(name: &str, days: i64) -> String {
    format!(
        "Hey {}.\n{FIRE} Your streak is {days} {} long.\n\n{CROSS} Use /relapse if you have relapsed.",
        escape_html(name),
        day_unit(days)
    )
}

pub fn stats(name: &str, all_days: i64, highest: i64, attempt: i64, current: i64) -> String {
    format!(
        "Hey {}, these are your stats.\n\n\
         📅 You went {all_days} days without relapsing\n\
         ⚡️ Your highest streak is {highest} days\n\
         💂 This is your {} attempt\n\
         {FIRE} Your current streak is {current} days long\n",
        escape_html(name),
        ordinal(attempt)
    )
}

pub fn help(base_repo: Option<&str>) -> String {
    let mut text = String::from(
        "/streak - 🍀 start a new streak\n\
         /relapse - 🗑 relapse a streak\n\
         /enableScoreboard - ✅  make your account show up on the scoreboard\n\
         /setStreak &lt;daysCount&gt; - ⚙️ set a custom streak\n\
         /stats - 📊 display some statistics\n\
         /check &lt;id/username&gt; - 🔧  deletes account from scoreboard if it's been deleted\n\
         /deleteAllDataAboutMe - 🗑 Delete all data about yourself\n\
         /removeFromLeaderboard &lt;id/username&gt; - 🗑 Remove user from leaderboard of this group (admin-only!)\n\
         /returnToLeaderboard &lt;id/username&gt; - 🗑 Return user to leaderboard of this group, if it's banned (admin-only!)\n\
         /autodelete &lt;on/off&gt; - ⏱ Delete my replies in this group after a while (admin-only!)\n",
    );
    if let Some(repo) = base_repo {
        text.push_str(
            "\nIf you like this bot and want to support development, consider giving this project a star on GitHub:\n",
        );
        text.push_str(&escape_html(repo));
    }
    text
}

pub fn confirm_relapse() -> String {
    "Are you sure you want to register a <b>relapse</b>?".to_string()
}

pub fn relapse(days: i64, name: &str) -> String {
    format!(
        "{BIN} Sad to see your streak of {days} {} go down the drain.\n\n\
         I started a new streak for you.\n\n\
         🍀 Good luck, {}, you will need it.\n\n\
         👉🏻 Check the <a href='https://easypeasymethod.org/'>easypeasy</a> method, it might help you.",
        day_unit(days),
        escape_html(name)
    )
}

pub fn streak_set(days: i64) -> String {
    format!("{TICK} Now your streak is {days} {}", day_unit(days))
}

pub fn set_streak_usage() -> String {
    format!("{CROSS} Usage: <code>/setStreak &lt;daysCount&gt;</code> (0 to 100000)")
}

pub fn scoreboard_enabled() -> String {
    format!("{TICK} You are now appearing on the scoreboard.")
}

pub fn scoreboard_already_enabled() -> String {
    format!("{FORBIDDEN} You already enabled scoreboards.")
}

pub fn scoreboard_private_chat() -> String {
    format!("{FORBIDDEN} You can't enable scoreboards in private chat.")
}

pub fn cancelled() -> String {
    format!("{OK} Cancelled.")
}

pub fn confirm_delete_all() -> String {
    "Are you sure you want to delete <b>ALL</b> data about yourself? This is <b>IRREVERSIBLE</b> \
     and no one on the entire planet Earth will be able to restore your streaks!"
        .to_string()
}

pub fn nothing_to_delete() -> String {
    "I don't have any info about you at the moment. You can register a streak with /streak command.".to_string()
}

pub fn all_data_deleted() -> String {
    format!(
        "{BIN} From now I know nothing about you! All your data was erased forever. \
         If you want to start again, just use /streak command."
    )
}

/// Usage hint for the commands that take a user id or @username.
pub fn target_usage(command: &str, description: &str) -> String {
    format!(
        "{CROSS} Not enough arguments.\n<b>USAGE</b>:\n<code>/{command} &lt;id/username&gt;</code>\n\n<i>{description}</i>"
    )
}

pub fn autodelete_usage() -> String {
    format!(
        "{CROSS} Not enough arguments.\n<b>USAGE</b>:\n<code>/autodelete &lt;on/off&gt;</code>\n\n\
         <i>Enables or disables autodeleting messages in groups (admins only)</i>"
    )
}

pub fn autodelete_set(enabled: bool) -> String {
    format!(
        "Successfully turned autodeleting messages {}",
        if enabled { "on" } else { "off" }
    )
}

pub fn removed_from_scoreboard(user_id: i64) -> String {
    format!("Successfully removed account with id {user_id} from scoreboard of this group.")
}

pub fn returned_to_scoreboard(user_id: i64) -> String {
    format!("Successfully returned an account with id {user_id} to scoreboard of this group.")
}

pub fn not_on_scoreboard(user_id: i64) -> String {
    format!("Account with id {user_id} is not on the scoreboard of this group.")
}

pub fn check_query_failed() -> String {
    "Query failed. If you sure you entered right ID, then wait some time to Telegram to wake up \
     from maintenance or something."
        .to_string()
}

pub fn check_user_alive() -> String {
    "This user is alive and hasn't deleted their account yet.".to_string()
}

pub fn check_user_removed(user_id: i64) -> String {
    format!("Successfully removed account with id {user_id} from my database.")
}
