//! crates/streak_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or chat transport.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Whole days elapsed between `since` and `now`, truncated. Never negative.
pub fn elapsed_days(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days().max(0)
}

/// A person tracking a streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub username: Option<String>,
    pub streak_start: DateTime<Utc>,
    pub attempts: i32,
    pub maximum_days: i64,
    pub all_days: i64,
}

impl User {
    /// A fresh user whose first streak starts at `now`.
    pub fn new(user_id: i64, name: String, username: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            name,
            username,
            streak_start: now,
            attempts: 1,
            maximum_days: 0,
            all_days: 0,
        }
    }

    pub fn current_days(&self, now: DateTime<Utc>) -> i64 {
        elapsed_days(self.streak_start, now)
    }

    /// Registers a relapse and returns the length of the streak that was lost.
    pub fn relapse(&mut self, now: DateTime<Utc>) -> i64 {
        let days = self.current_days(now);
        if days > self.maximum_days {
            self.maximum_days = days;
        }
        self.all_days += days;
        self.streak_start = now;
        self.attempts += 1;
        days
    }

    /// Moves the streak start so the current streak is exactly `days` long.
    pub fn set_streak_days(&mut self, days: i64, now: DateTime<Utc>) {
        self.streak_start = now - Duration::days(days);
    }

    /// Total relapse-free days, including the running streak.
    pub fn total_days(&self, now: DateTime<Utc>) -> i64 {
        self.all_days + self.current_days(now)
    }
}

/// A group chat that has interacted with the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub group_id: i64,
    pub autodelete: bool,
}

/// The link between a user and a group's scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    pub user_id: i64,
    pub group_id: i64,
    pub is_banned: bool,
}

/// A user as seen from one group's scoreboard: the row the persistence
/// layer hands to the ranking step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub user_id: i64,
    pub display_name: String,
    pub handle: Option<String>,
    pub streak_start: DateTime<Utc>,
    pub is_banned: bool,
}

/// One ranked line of a scoreboard. Derived fresh on every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub display_name: String,
    pub handle: Option<String>,
    pub days: i64,
}

/// Opaque scope identifying a conversation context that hosts at most one
/// live scoreboard. Distinct from the raw chat id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatInstance(pub String);

impl fmt::Display for ChatInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The outbound message currently playing the role of a scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub chat_id: i64,
    pub message_id: i32,
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;
