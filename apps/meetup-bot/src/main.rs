use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use teloxide::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod models;
mod services;
mod state;

use crate::config::BotConfig;
use crate::state::AppState;

const DEFAULT_ABOUT: &str = "We are a community of developers meeting to share talks and ideas.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetup_bot=info,meetup_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Meetup Bot...");

    let config = BotConfig::from_env().context("Invalid configuration")?;
    debug!("Loaded {:?}", config);
    if config.admin_ids.is_empty() {
        warn!("ADMIN_IDS is empty, nobody can manage events");
    }
    if config.payments_token.is_none() {
        info!("PAYMENTS_TOKEN is not set, donations are disabled");
    }

    let about = match tokio::fs::read_to_string(&config.about_path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {}: {}, using the default text", config.about_path, e);
            DEFAULT_ABOUT.to_string()
        }
    };

    let repos = meetup_db::connect(&config.database_url, config.db_max_connections).await?;
    info!("Database ready");

    let bot = Bot::new(config.bot_token.clone());
    let state = AppState {
        config: Arc::new(config),
        repos,
        about: Arc::from(about.trim()),
    };

    bot::run_bot(bot, state).await;
    Ok(())
}
