//! OAuth state and Discord API interactions
//!
//! The three outbound calls a callback makes, in order: exchange the
//! authorization code for a token, read the user's profile, read the user's
//! connections. Each call is attempted exactly once; any failure is reported
//! as absence, never as an error the handler has to unpack.

use serde::Deserialize;
use tracing::{debug, error};

use crate::models::Identity;

/// Discord API base used when `DISCORD_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v8";

/// Type tag Discord puts on linked Twitch accounts in the connections list.
const TWITCH_CONNECTION_TYPE: &str = "twitch";

/// OAuth configuration
#[derive(Clone)]
pub struct OAuthState {
    pub client_id: u64,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Base URL for all Discord API calls (overridable for tests).
    pub api_base: String,
    pub http_client: reqwest::Client,
}

impl OAuthState {
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("DISCORD_CLIENT_ID").ok()?.parse().ok()?;
        let client_secret = std::env::var("DISCORD_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("DISCORD_REDIRECT_URI").ok()?;
        let api_base = std::env::var("DISCORD_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
            api_base,
            http_client: reqwest::Client::new(),
        })
    }

    /// Authorization URL the `/redirect` endpoint sends browsers to.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/oauth2/authorize?client_id={}&redirect_uri={}&response_type=code&scope=identify%20connections",
            self.api_base,
            self.client_id,
            urlencoding::encode(&self.redirect_uri),
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// `None` on a transport error, a non-success status, or a body without
    /// an `access_token` field.
    pub async fn fetch_token(&self, code: &str) -> Option<String> {
        let url = format!("{}/oauth2/token", self.api_base);
        let client_id = self.client_id.to_string();
        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await;

        let body = log_response("POST", &url, response).await?;
        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => Some(token.access_token),
            Err(e) => {
                error!("Token response has no usable access_token: {}", e);
                None
            }
        }
    }

    /// Fetch the authenticated user's Discord profile.
    ///
    /// An absent token short-circuits to `None` without a network call.
    pub async fn fetch_discord_account(&self, token: Option<&str>) -> Option<Identity> {
        let token = token?;
        let url = format!("{}/users/@me", self.api_base);
        let response = self.http_client.get(&url).bearer_auth(token).send().await;

        let body = log_response("GET", &url, response).await?;
        let user = match serde_json::from_str::<DiscordUser>(&body) {
            Ok(user) => user,
            Err(e) => {
                error!("Unparseable user profile: {}", e);
                return None;
            }
        };

        let id = user.id.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0);
        let username = format!(
            "{}#{}",
            user.username.as_deref().unwrap_or("UNKNOWN_USER"),
            user.discriminator.as_deref().unwrap_or("0000"),
        );
        Some(Identity { id, username })
    }

    /// Fetch the user's linked Twitch account from their connections.
    ///
    /// Same short-circuit on an absent token. The first twitch-typed entry
    /// wins; Discord's list order is authoritative. `None` when no entry
    /// matches or the call fails.
    pub async fn fetch_twitch_account(&self, token: Option<&str>) -> Option<Identity> {
        let token = token?;
        let url = format!("{}/users/@me/connections", self.api_base);
        let response = self.http_client.get(&url).bearer_auth(token).send().await;

        let body = log_response("GET", &url, response).await?;
        let connections = match serde_json::from_str::<Vec<Connection>>(&body) {
            Ok(list) => list,
            Err(e) => {
                error!("Unparseable connections list: {}", e);
                return None;
            }
        };

        let connection = connections
            .into_iter()
            .find(|c| c.kind == TWITCH_CONNECTION_TYPE)?;
        let id = connection.id.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0);
        let username = connection
            .name
            .unwrap_or_else(|| "UNKNOWN_USER".to_string());
        Some(Identity { id, username })
    }
}

/// Log an outbound Discord call and return its body when it succeeded.
///
/// Every call is logged with method, URL, status and body; failures at
/// `error`, successes at `debug`.
async fn log_response(
    method: &str,
    url: &str,
    response: reqwest::Result<reqwest::Response>,
) -> Option<String> {
    let response = match response {
        Ok(r) => r,
        Err(e) => {
            error!("{} {} failed: {}", method, url, e);
            return None;
        }
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        debug!("{} {} -> {} {}", method, url, status, body);
        Some(body)
    } else {
        error!("{} {} -> {} {}", method, url, status, body);
        None
    }
}

/// Discord OAuth token response
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Discord user info from `/users/@me`
#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: Option<String>,
    username: Option<String>,
    discriminator: Option<String>,
}

/// One entry of `/users/@me/connections`
#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(rename = "type")]
    kind: String,
    id: Option<String>,
    name: Option<String>,
}
