//! crates/streak_core/src/render.rs
//!
//! Turns a leaderboard snapshot into the HTML text shown in the chat.

use crate::domain::LeaderboardEntry;
use std::fmt::Write;

pub const SCOREBOARD_HEADING: &str = "🏆 Scoreboard";

/// "day" for exactly one, "days" otherwise.
pub fn day_unit(days: i64) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}

/// Escapes the characters that are significant in Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Users without a public handle are shown as a mention link keyed by id.
fn display_label(entry: &LeaderboardEntry) -> String {
    let name = escape_html(&entry.display_name);
    match &entry.handle {
        Some(handle) => format!("{} (@{})", name, escape_html(handle)),
        None => format!("<a href='tg://user?id={}'>{}</a>", entry.user_id, name),
    }
}

pub fn render(entries: &[LeaderboardEntry]) -> String {
    let mut text = format!("{SCOREBOARD_HEADING}\n\n");
    for entry in entries {
        // Writing into a String cannot fail.
        let _ = writeln!(
            text,
            "{}. {} — <b>{} {}</b>",
            entry.rank,
            display_label(entry),
            entry.days,
            day_unit(entry.days)
        );
    }
    text
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
