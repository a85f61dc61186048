//! services/bot/src/config.rs
//!
//! Defines the bot's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use streak_core::DEFAULT_REFRESH_INTERVAL;
use tracing::Level;

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_BASE_REPO: &str = "https://github.com/Aqendo/streak-bot";
const DEFAULT_AUTODELETE_DELAY_SECS: u64 = 20;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_token: String,
    pub telegram_api_url: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub scoreboard_interval: Duration,
    pub autodelete_delay: Duration,
    pub poll_timeout_secs: u64,
    pub base_repo: String,
    pub show_base_repo_in_help: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Telegram ---
        let telegram_token = std::env::var("TELEGRAM_TOKEN")
            .or_else(|_| std::env::var("TOKEN"))
            .map_err(|_| ConfigError::MissingVar("TELEGRAM_TOKEN".to_string()))?;
        let telegram_api_url = std::env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let poll_timeout_secs = parse_var("POLL_TIMEOUT_SECONDS", DEFAULT_POLL_TIMEOUT_SECS)?;

        // --- Database ---
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => postgres_url_from_parts()?,
        };
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Behaviour ---
        let scoreboard_interval = scoreboard_interval()?;
        let autodelete_delay =
            Duration::from_secs(parse_var("AUTODELETE_DELAY_SECONDS", DEFAULT_AUTODELETE_DELAY_SECS)?);
        let base_repo = std::env::var("BASE_REPO").unwrap_or_else(|_| DEFAULT_BASE_REPO.to_string());
        let show_base_repo_in_help = std::env::var("SHOW_BASE_REPO_IN_HELP")
            .map(|v| is_enabled(&v))
            .unwrap_or(false);

        Ok(Self {
            telegram_token,
            telegram_api_url,
            database_url,
            db_max_connections,
            log_level,
            scoreboard_interval,
            autodelete_delay,
            poll_timeout_secs,
            base_repo,
            show_base_repo_in_help,
        })
    }
}

fn scoreboard_interval() -> Result<Duration, ConfigError> {
    parse_var("TIMEOUT_SCOREBOARD_IN_SECONDS", DEFAULT_REFRESH_INTERVAL.as_secs()).map(Duration::from_secs)
}

/// Builds a Postgres URL from the `POSTGRES_*` variables.
fn postgres_url_from_parts() -> Result<String, ConfigError> {
    let var = |name: &str| std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()));
    Ok(postgres_url(
        &var("POSTGRES_LOGIN")?,
        &var("POSTGRES_PASSWORD")?,
        &var("POSTGRES_HOST")?,
        &var("POSTGRES_DB")?,
    ))
}

fn postgres_url(login: &str, password: &str, host: &str, db: &str) -> String {
    format!("postgres://{login}:{password}@{host}/{db}")
}

fn is_enabled(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), format!("'{}' is not a number", raw))),
        Err(_) => Ok(default),
    }
}
