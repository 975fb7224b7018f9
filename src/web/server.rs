//! Router and handlers for the link flow.
//!
//! `/redirect` bounces the browser into Discord's authorization flow;
//! `/callback` runs the linear link sequence and always answers with a
//! `302 Found` onto one of the static result pages. Diagnostic detail goes
//! to the log stream only, never to the browser.

use std::net::SocketAddr;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::oauth::OAuthState;
use crate::models::LinkRecord;
use crate::state::{fetch_record, record_key, store_record, SharedRecordStore};

/// Web server configuration
pub struct ServerConfig {
    /// Listen port
    pub port: u16,
    /// Base URL (or path) the static result pages are served under
    pub pages_base: String,
    /// Whether new registrations are accepted
    pub joining_enabled: bool,
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6900),
            pages_base: std::env::var("PAGES_BASE_URL")
                .unwrap_or_else(|_| "/static".to_string()),
            joining_enabled: std::env::var("JOINING_ENABLED")
                .map(|s| s != "0" && !s.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        }
    }
}

/// Shared state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub oauth: OAuthState,
    pub store: SharedRecordStore,
    pub pages_base: String,
    pub joining_enabled: bool,
    /// Authorization URL, computed once at startup
    authorize_url: String,
}

impl AppState {
    pub fn new(oauth: OAuthState, store: SharedRecordStore, config: &ServerConfig) -> Self {
        let authorize_url = oauth.authorize_url();
        Self {
            oauth,
            store,
            pages_base: config.pages_base.clone(),
            joining_enabled: config.joining_enabled,
            authorize_url,
        }
    }

    fn finish(&self, outcome: Outcome) -> Response {
        found(&format!("{}/{}", self.pages_base, outcome.page()))
    }
}

/// Result page a finished callback lands the browser on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    InternalError,
    TwitchNotLinked,
    JoiningDisabled,
}

impl Outcome {
    fn page(self) -> &'static str {
        match self {
            Outcome::Success => "success.html",
            Outcome::InternalError => "internal_error.html",
            Outcome::TwitchNotLinked => "twitch_not_linked.html",
            Outcome::JoiningDisabled => "joining_disabled.html",
        }
    }
}

/// Query parameters from Discord OAuth callback
#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
}

/// Start the web server
pub async fn start_web_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Web server listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Build the router; separate from [`start_web_server`] so tests can drive
/// it over an ephemeral listener.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/redirect", get(oauth_redirect))
        .route("/callback", get(oauth_callback))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> &'static str {
    "Twitch link server running"
}

/// GET /redirect - send the browser into Discord's authorization flow
async fn oauth_redirect(State(state): State<AppState>) -> Response {
    found(&state.authorize_url)
}

/// GET /callback - OAuth callback handler
///
/// Linear sequence with early exit: registration toggle, store liveness,
/// code extraction, token exchange, profile fetch, connection fetch, record
/// upsert. Each failure maps to its result page.
async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if !state.joining_enabled {
        info!("Callback rejected: joining is disabled");
        return state.finish(Outcome::JoiningDisabled);
    }

    if !state.store.ping().await {
        error!("Record store is unreachable, aborting callback");
        return state.finish(Outcome::InternalError);
    }

    let Some(code) = params.code else {
        warn!("Callback without authorization code");
        return state.finish(Outcome::InternalError);
    };

    let Some(token) = state.oauth.fetch_token(&code).await else {
        return state.finish(Outcome::InternalError);
    };

    let Some(discord) = state.oauth.fetch_discord_account(Some(&token)).await else {
        return state.finish(Outcome::InternalError);
    };

    let Some(twitch) = state.oauth.fetch_twitch_account(Some(&token)).await else {
        info!("{} has no linked twitch account", discord.username);
        return state.finish(Outcome::TwitchNotLinked);
    };

    info!(
        "Linking discord account {} ({}) to twitch account {} ({})",
        discord.username, discord.id, twitch.username, twitch.id
    );

    let record = LinkRecord {
        discord_username: discord.username.clone(),
        twitch_id: twitch.id,
        twitch_username: twitch.username.clone(),
    };

    // Absence is the normal case; a prior record is only interesting for
    // the logs. The overwrite below happens either way.
    match fetch_record(state.store.as_ref(), discord.id).await {
        Ok(None) => info!("New registration for {}", record_key(discord.id)),
        Ok(Some(previous)) if previous != record => info!(
            "Re-registration for {}: {:?} replaces {:?}",
            record_key(discord.id),
            record,
            previous
        ),
        Ok(Some(_)) => info!(
            "Re-registration for {} with unchanged data",
            record_key(discord.id)
        ),
        Err(e) => warn!(
            "Could not read prior record for {}: {}",
            record_key(discord.id),
            e
        ),
    }

    if let Err(e) = store_record(state.store.as_ref(), discord.id, &record).await {
        error!(
            "Failed to store link record for {}: {}",
            record_key(discord.id),
            e
        );
        return state.finish(Outcome::InternalError);
    }

    state.finish(Outcome::Success)
}

/// Plain `302 Found` redirect; the result pages are static files served
/// outside this process.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
