//! services/bot/src/error.rs
//!
//! Defines the error types of the bot service.

use crate::config::ConfigError;
use streak_core::ports::PortError;

/// A failed call to the Telegram Bot API.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Telegram request failed: {0}")]
    Http(String),

    /// Telegram answered with `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },

    /// The response body could not be understood.
    #[error("Unexpected Telegram response: {0}")]
    Decode(String),
}

/// The primary error type for the `bot` service.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error from the database migrator.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents an error talking to Telegram.
    #[error("Telegram Error: {0}")]
    Telegram(#[from] TelegramError),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
