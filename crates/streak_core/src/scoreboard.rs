//! crates/streak_core/src/scoreboard.rs
//!
//! The entry point used by the command layer: turns a message into a live
//! scoreboard and owns the loops it starts.

use crate::domain::{ChatInstance, MessageHandle};
use crate::ports::MessagingService;
use crate::ranking::RankQuery;
use crate::refresh::RefreshLoop;
use crate::registry::ScoreboardRegistry;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct ScoreboardService {
    registry: Arc<ScoreboardRegistry>,
    ranker: RankQuery,
    messenger: Arc<dyn MessagingService>,
    interval: Duration,
}

impl ScoreboardService {
    pub fn new(
        registry: Arc<ScoreboardRegistry>,
        ranker: RankQuery,
        messenger: Arc<dyn MessagingService>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            ranker,
            messenger,
            interval,
        }
    }

    pub fn registry(&self) -> &Arc<ScoreboardRegistry> {
        &self.registry
    }

    /// Makes `message` the live scoreboard of `instance` for `group_id` and
    /// spawns its refresh loop. Any loop previously bound to the instance
    /// is cancelled.
    pub async fn turn_into_scoreboard(&self, instance: ChatInstance, message: MessageHandle, group_id: i64) {
        let activation = self.registry.activate(instance.clone(), message).await;
        let refresh = RefreshLoop::new(
            self.ranker.clone(),
            self.messenger.clone(),
            group_id,
            message,
            self.interval,
            activation.token,
        );
        let task = tokio::spawn(async move {
            refresh.run().await;
        });
        self.registry.attach(&instance, activation.id, task).await;
    }

    /// Cancels every live loop and waits for them to finish.
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}

#[cfg(test)]
#[path = "scoreboard_test.rs"]
mod tests;
