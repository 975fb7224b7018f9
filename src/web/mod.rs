//! Web server for the Discord→Twitch link flow
//!
//! `/redirect` sends the browser into Discord's OAuth2 authorization flow,
//! `/callback` receives the authorization code and finishes the link. A
//! health check answers on `/`.

mod oauth;
mod server;

pub use oauth::OAuthState;
pub use server::{start_web_server, AppState, ServerConfig};
