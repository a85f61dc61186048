//! crates/streak_core/src/ranking.rs
//!
//! Computes the ordered leaderboard for one group.

use crate::domain::{elapsed_days, GroupMember, LeaderboardEntry};
use crate::ports::{Clock, MemberDirectory, PortResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Maximum number of entries shown on a scoreboard.
pub const LEADERBOARD_LIMIT: usize = 50;

/// Ranks unbanned members by streak start, earliest (longest streak) first.
///
/// The sort is stable, so members with identical streak starts keep the
/// order they arrived in.
pub fn rank_members(members: Vec<GroupMember>, now: DateTime<Utc>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut eligible: Vec<GroupMember> = members.into_iter().filter(|m| !m.is_banned).collect();
    eligible.sort_by_key(|m| m.streak_start);
    eligible.truncate(limit);

    eligible
        .into_iter()
        .enumerate()
        .map(|(index, member)| LeaderboardEntry {
            rank: index + 1,
            user_id: member.user_id,
            days: elapsed_days(member.streak_start, now),
            display_name: member.display_name,
            handle: member.handle,
        })
        .collect()
}

/// Read-only leaderboard query over the member directory.
#[derive(Clone)]
pub struct RankQuery {
    directory: Arc<dyn MemberDirectory>,
    clock: Arc<dyn Clock>,
    limit: usize,
}

impl RankQuery {
    pub fn new(directory: Arc<dyn MemberDirectory>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            clock,
            limit: LEADERBOARD_LIMIT,
        }
    }

    /// An empty vector is a valid result: nobody in the group qualifies.
    pub async fn rank(&self, group_id: i64) -> PortResult<Vec<LeaderboardEntry>> {
        let members = self.directory.query_group_members(group_id).await?;
        Ok(rank_members(members, self.clock.now(), self.limit))
    }
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
