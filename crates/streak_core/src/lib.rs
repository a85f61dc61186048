//! Streak leaderboards: ranking, rendering and the live scoreboard loops.

pub mod domain;
pub mod ports;
pub mod ranking;
pub mod refresh;
pub mod registry;
pub mod render;
pub mod scoreboard;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use domain::{ChatInstance, Group, GroupMember, GroupMembership, LeaderboardEntry, MessageHandle, User};
pub use ports::{
    Clock, MemberDirectory, MessagingService, PortError, PortResult, PushError, PushOutcome, StreakRepository,
    SystemClock,
};
pub use ranking::{RankQuery, LEADERBOARD_LIMIT};
pub use refresh::{LoopExit, RefreshLoop, DEFAULT_REFRESH_INTERVAL};
pub use registry::{Activation, ScoreboardRegistry};
pub use scoreboard::ScoreboardService;
