use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::info;

mod error;
mod models;
mod state;
mod web;

use state::{RedisConfig, RedisStore};
use web::{start_web_server, AppState, OAuthState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let oauth = OAuthState::from_env().context(
        "DISCORD_CLIENT_ID, DISCORD_CLIENT_SECRET and DISCORD_REDIRECT_URI must be set \
         (client id must be numeric)",
    )?;
    let server_config = ServerConfig::from_env();
    let redis_config = RedisConfig::from_env();

    info!("Connecting to redis at {}...", redis_config.host);
    let store = RedisStore::connect(&redis_config)
        .await
        .context("Failed to connect to the record store")?;

    info!("=== Discord OAuth Configuration ===");
    info!("Redirect URI: {}", oauth.redirect_uri);
    info!("Add it under https://discord.com/developers/applications -> OAuth2 -> Redirects");
    if !server_config.joining_enabled {
        info!("JOINING_ENABLED=false: callbacks will land on the joining-disabled page");
    }

    let app_state = AppState::new(oauth, Arc::new(store), &server_config);
    start_web_server(server_config, app_state).await
}
