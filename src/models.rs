// src/models.rs
use serde::{Deserialize, Serialize};

/// A minimal (id, display name) pair for an external account.
///
/// Lives only for the duration of one callback request; Discord usernames
/// are synthesized as `name#discriminator`, Twitch usernames are taken as
/// the provider reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    pub username: String,
}

/// The persisted Discord→Twitch association.
///
/// A flat JSON object with camelCase keys, stored under
/// `"<namespace>_<discord_id>"`. At most one record per Discord id;
/// re-registration overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub discord_username: String,
    pub twitch_id: u64,
    pub twitch_username: String,
}
