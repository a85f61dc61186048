//! crates/streak_core/src/refresh.rs
//!
//! The long-running task that keeps one scoreboard message up to date.

use crate::domain::MessageHandle;
use crate::ports::{MessagingService, PushError, PushOutcome};
use crate::ranking::RankQuery;
use crate::render::render;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(180);

/// Why a refresh loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The token was cancelled: another message took over this chat
    /// instance, or the process is shutting down.
    Superseded,
    /// The message is gone or can no longer be edited.
    Unrenderable,
}

pub struct RefreshLoop {
    ranker: RankQuery,
    messenger: Arc<dyn MessagingService>,
    group_id: i64,
    message: MessageHandle,
    interval: Duration,
    token: CancellationToken,
}

impl RefreshLoop {
    pub fn new(
        ranker: RankQuery,
        messenger: Arc<dyn MessagingService>,
        group_id: i64,
        message: MessageHandle,
        interval: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            ranker,
            messenger,
            group_id,
            message,
            interval,
            token,
        }
    }

    /// Runs until the token is cancelled or the message becomes unrenderable.
    ///
    /// Each cycle ranks, renders and pushes, then sleeps for the interval.
    /// The sleep races the token, so a superseded loop never pushes again.
    pub async fn run(self) -> LoopExit {
        info!(message = %self.message, group_id = self.group_id, "Scoreboard loop started.");

        loop {
            if self.token.is_cancelled() {
                break;
            }

            if let ControlFlow::Break(exit) = self.refresh_once().await {
                info!(message = %self.message, ?exit, "Scoreboard loop ended.");
                return exit;
            }

            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(message = %self.message, "Scoreboard loop superseded.");
        LoopExit::Superseded
    }

    async fn refresh_once(&self) -> ControlFlow<LoopExit> {
        let entries = match self.ranker.rank(self.group_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(group_id = self.group_id, "Skipping scoreboard refresh, ranking failed: {}", e);
                return ControlFlow::Continue(());
            }
        };
        let text = render(&entries);

        // The query may have taken a while; a loop superseded meanwhile must not push.
        if self.token.is_cancelled() {
            return ControlFlow::Break(LoopExit::Superseded);
        }

        match self.messenger.push_update(&self.message, &text).await {
            Ok(PushOutcome::Updated) => {
                debug!(message = %self.message, entries = entries.len(), "Scoreboard updated.");
                ControlFlow::Continue(())
            }
            Ok(PushOutcome::Unchanged) => ControlFlow::Continue(()),
            Err(PushError::Unrenderable(reason)) => {
                debug!(message = %self.message, %reason, "Scoreboard message is gone.");
                ControlFlow::Break(LoopExit::Unrenderable)
            }
            Err(PushError::Transient(reason)) => {
                warn!(message = %self.message, %reason, "Scoreboard push failed, retrying next cycle.");
                ControlFlow::Continue(())
            }
        }
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
