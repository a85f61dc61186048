//! services/bot/src/bin/bot.rs

use bot_lib::{
    adapters::{DbAdapter, TelegramClient},
    bot::{run_polling, AppState},
    config::Config,
    error::BotError,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use streak_core::{RankQuery, ScoreboardRegistry, ScoreboardService, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), BotError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting bot...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Telegram Adapter ---
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.telegram_token,
        config.poll_timeout_secs,
    )?);
    let me = telegram.get_me().await?;
    info!(bot_id = me.id, username = ?me.username, "Authorized with Telegram.");
    telegram.delete_webhook(true).await?;

    // --- 4. Build the Scoreboard Service & Shared AppState ---
    let clock = Arc::new(SystemClock);
    let scoreboards = ScoreboardService::new(
        Arc::new(ScoreboardRegistry::new()),
        RankQuery::new(db_adapter.clone(), clock.clone()),
        telegram.clone(),
        config.scoreboard_interval,
    );
    info!(interval = ?config.scoreboard_interval, "Scoreboard refresh configured.");

    let app_state = Arc::new(AppState {
        db: db_adapter,
        chat: telegram.clone(),
        scoreboards: scoreboards.clone(),
        clock,
        config: config.clone(),
        bot_username: me.username,
    });

    // --- 5. Poll Until Ctrl-C ---
    let shutdown = CancellationToken::new();
    let polling = tokio::spawn(run_polling(
        app_state,
        telegram,
        config.poll_timeout_secs,
        shutdown.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested.");
    shutdown.cancel();
    if let Err(e) = polling.await {
        warn!("Polling task ended abnormally: {}", e);
    }

    // --- 6. Stop Live Scoreboards ---
    scoreboards.shutdown().await;
    info!("Bot stopped.");

    Ok(())
}
