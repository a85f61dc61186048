//! In-memory port implementations shared by the unit tests.

use crate::domain::{GroupMember, MessageHandle};
use crate::ports::{Clock, MemberDirectory, MessagingService, PortError, PortResult, PushError, PushOutcome};
use crate::ranking::RankQuery;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

pub(crate) fn member(user_id: i64, name: &str, days_ago: i64, is_banned: bool) -> GroupMember {
    GroupMember {
        user_id,
        display_name: name.to_string(),
        handle: None,
        streak_start: now() - Duration::days(days_ago),
        is_banned,
    }
}

pub(crate) fn message(message_id: i32) -> MessageHandle {
    MessageHandle { chat_id: -1001, message_id }
}

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A directory whose members can be swapped between refreshes.
#[derive(Default)]
pub(crate) struct MemoryDirectory {
    members: Mutex<Vec<GroupMember>>,
    failing: Mutex<bool>,
}

impl MemoryDirectory {
    pub(crate) fn with_members(members: Vec<GroupMember>) -> Self {
        Self {
            members: Mutex::new(members),
            failing: Mutex::new(false),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl MemberDirectory for MemoryDirectory {
    async fn query_group_members(&self, _group_id: i64) -> PortResult<Vec<GroupMember>> {
        if *self.failing.lock().unwrap() {
            return Err(PortError::Unexpected("database unavailable".into()));
        }
        Ok(self.members.lock().unwrap().clone())
    }
}

/// Records every push; answers from a script, then `Updated` forever.
#[derive(Default)]
pub(crate) struct RecordingMessenger {
    pushes: Mutex<Vec<(MessageHandle, String)>>,
    script: Mutex<VecDeque<Result<PushOutcome, PushError>>>,
}

impl RecordingMessenger {
    pub(crate) fn scripted(script: Vec<Result<PushOutcome, PushError>>) -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
        }
    }

    pub(crate) fn pushes(&self) -> Vec<(MessageHandle, String)> {
        self.pushes.lock().unwrap().clone()
    }

    pub(crate) fn pushes_to(&self, message: MessageHandle) -> usize {
        self.pushes.lock().unwrap().iter().filter(|(m, _)| *m == message).count()
    }
}

#[async_trait]
impl MessagingService for RecordingMessenger {
    async fn push_update(&self, message: &MessageHandle, text: &str) -> Result<PushOutcome, PushError> {
        self.pushes.lock().unwrap().push((*message, text.to_string()));
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(PushOutcome::Updated))
    }
}

pub(crate) fn rank_query(directory: Arc<MemoryDirectory>) -> RankQuery {
    RankQuery::new(directory, Arc::new(FixedClock(now())))
}
