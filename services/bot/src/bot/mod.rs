pub mod callbacks;
pub mod chat;
pub mod command;
pub mod dispatcher;
pub mod handlers;
pub mod messages;
pub mod state;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export the entry points the binary needs to wire up the bot.
pub use dispatcher::{process_update, run_polling};
pub use state::AppState;
