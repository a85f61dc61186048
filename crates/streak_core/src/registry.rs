//! crates/streak_core/src/registry.rs
//!
//! Tracks which message is the live scoreboard for each chat instance.
//!
//! Activating an instance replaces its binding and cancels the loop that was
//! refreshing the previous message. The registry also owns the root shutdown
//! token, so every loop it hands a token to can be stopped at once.

use crate::domain::{ChatInstance, MessageHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The live binding for one chat instance.
struct ActiveScoreboard {
    activation: u64,
    message: MessageHandle,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// A fresh binding handed to the loop that will serve it.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Unique per `activate` call, even when the same message is re-bound.
    pub id: u64,
    pub token: CancellationToken,
}

pub struct ScoreboardRegistry {
    entries: Mutex<HashMap<ChatInstance, ActiveScoreboard>>,
    next_activation: AtomicU64,
    shutdown: CancellationToken,
}

impl Default for ScoreboardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreboardRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_activation: AtomicU64::new(1),
            shutdown: CancellationToken::new(),
        }
    }

    /// Binds `message` as the scoreboard of `instance`, superseding whatever
    /// was bound before, and returns the activation the new loop must honor.
    ///
    /// Re-activating the same message still cancels the earlier loop, so at
    /// most one loop per instance is ever live.
    pub async fn activate(&self, instance: ChatInstance, message: MessageHandle) -> Activation {
        let id = self.next_activation.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(
            instance.clone(),
            ActiveScoreboard {
                activation: id,
                message,
                token: token.clone(),
                task: None,
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
            debug!(
                %instance,
                previous = %previous.message,
                current = %message,
                "Scoreboard superseded."
            );
        }
        Activation { id, token }
    }

    /// Retains the handle of the task serving `activation`. Ignored when the
    /// binding was superseded in the meantime, even by the same message;
    /// that task is already cancelled.
    pub async fn attach(&self, instance: &ChatInstance, activation: u64, task: JoinHandle<()>) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(instance) {
            Some(entry) if entry.activation == activation => {
                entry.task = Some(task);
                true
            }
            _ => false,
        }
    }

    /// Whether `message` is still the scoreboard bound to `instance`.
    pub async fn is_current(&self, instance: &ChatInstance, message: MessageHandle) -> bool {
        self.entries
            .lock()
            .await
            .get(instance)
            .is_some_and(|entry| entry.message == message)
    }

    /// Number of bindings, including ones whose loop already ended.
    pub async fn active_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Cancels every loop and waits for the retained tasks to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let drained: Vec<(ChatInstance, ActiveScoreboard)> = self.entries.lock().await.drain().collect();
        info!(count = drained.len(), "Stopping scoreboard loops.");

        for (instance, entry) in drained {
            if let Some(task) = entry.task {
                if let Err(e) = task.await {
                    warn!(%instance, "Scoreboard task ended abnormally: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
