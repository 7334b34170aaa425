mod actor;
mod bot;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod settings;
mod startup;
mod util;

use std::sync::Arc;

use serenity::http::Http;

use crate::config::Config;
use crate::scheduler::rename::{HttpRenamer, RenameThrottler};
use crate::settings::Settings;
use crate::util::clock::SystemClock;

/// Seconds between rename throttler drain passes.
const RENAME_DRAIN_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let settings = Arc::new(Settings::from_yaml(&config.settings_path)?);
    let db = startup::connect_to_database(&config).await?;

    // A dedicated HTTP client for the background tasks; the gateway client
    // keeps its own.
    let http = Arc::new(Http::new(&config.discord_bot_token));

    let renames = Arc::new(RenameThrottler::new(
        Arc::new(HttpRenamer::new(http.clone())),
        Arc::new(SystemClock),
    ));

    scheduler::alerts::start_scheduler(
        db.clone(),
        http.clone(),
        settings.clone(),
        renames.clone(),
    )
    .await?;

    let drain = renames.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(RENAME_DRAIN_SECS));
        loop {
            tick.tick().await;
            drain.tick().await;
        }
    });

    let mut client = bot::start::init_bot(&config, db, settings, renames).await?;
    bot::start::start_bot(&mut client).await
}
