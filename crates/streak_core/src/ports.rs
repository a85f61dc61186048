//! crates/streak_core/src/ports.rs
//!
//! Defines the service contracts (traits) the scoreboard core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the database and of the chat transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::{Group, GroupMember, GroupMembership, MessageHandle, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for persistence port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Messaging Outcomes
//=========================================================================================

/// A successful push of scoreboard text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The message now shows the new text.
    Updated,
    /// The message already showed exactly this text.
    Unchanged,
}

/// A failed push of scoreboard text.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The message was deleted or can no longer be edited. Terminal for a loop.
    #[error("Message can no longer be rendered: {0}")]
    Unrenderable(String),
    /// Network or server hiccup. The next cycle may succeed.
    #[error("Transient push failure: {0}")]
    Transient(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read side used by the scoreboard: every member of a group with their
/// streak and ban flag.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn query_group_members(&self, group_id: i64) -> PortResult<Vec<GroupMember>>;
}

/// Pushes rendered text into an existing chat message.
#[async_trait]
pub trait MessagingService: Send + Sync {
    async fn push_update(&self, message: &MessageHandle, text: &str) -> Result<PushOutcome, PushError>;
}

/// Write side used by the bot commands.
#[async_trait]
pub trait StreakRepository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, user_id: i64) -> PortResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<User>>;

    async fn create_user(&self, user: &User) -> PortResult<()>;

    /// Persists streak bookkeeping (start, attempts, best, total).
    async fn save_streak(&self, user: &User) -> PortResult<()>;

    /// Updates the stored name and username if they differ. Returns whether
    /// a row changed.
    async fn sync_identity(
        &self,
        user_id: i64,
        name: &str,
        username: Option<&str>,
    ) -> PortResult<bool>;

    /// Removes the user and all of their memberships.
    async fn delete_user_data(&self, user_id: i64) -> PortResult<()>;

    // --- Memberships ---
    async fn get_membership(&self, user_id: i64, group_id: i64) -> PortResult<Option<GroupMembership>>;

    async fn add_membership(&self, user_id: i64, group_id: i64) -> PortResult<()>;

    async fn set_banned(&self, user_id: i64, group_id: i64, is_banned: bool) -> PortResult<()>;

    // --- Groups ---
    async fn get_or_create_group(&self, group_id: i64) -> PortResult<Group>;

    async fn set_autodelete(&self, group_id: i64, autodelete: bool) -> PortResult<()>;
}

/// Source of "now". Lets tests pin the clock used for day arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
