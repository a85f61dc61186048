//! services/bot/src/bot/sync.rs
//!
//! Keeps stored display names and usernames in step with Telegram, so the
//! scoreboard shows what users currently call themselves.

use crate::bot::state::AppState;
use crate::bot::types::Update;
use tracing::{debug, warn};

/// Runs before every handler. Unknown users are left alone.
pub async fn sync_sender(state: &AppState, update: &Update) {
    let Some(user) = update.sender() else {
        return;
    };
    match state
        .db
        .sync_identity(user.id, &user.full_name(), user.username.as_deref())
        .await
    {
        Ok(true) => debug!(user_id = user.id, "Stored name updated."),
        Ok(false) => {}
        Err(e) => warn!(user_id = user.id, "Failed to sync user name: {}", e),
    }
}
