//! Keyed storage for Discord→Twitch link records.
//!
//! The store itself only sees opaque string keys and values; everything that
//! knows about the record's JSON shape lives in [`fetch_record`] and
//! [`store_record`], so a schema change touches one boundary.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::LinkRecord;

/// Prefix every record key carries in the key-value store.
pub const KEY_NAMESPACE: &str = "twitch_link";

/// Store key for a Discord id: `"<namespace>_<discord_id>"`.
pub fn record_key(discord_id: u64) -> String {
    format!("{}_{}", KEY_NAMESPACE, discord_id)
}

/// Minimal keyed get/set surface over the external key-value service.
///
/// No transactions span get+set; concurrent callbacks for the same Discord
/// id can race at this layer and the last `set` wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Whether the backing service currently answers.
    async fn ping(&self) -> bool;
}

/// Shared store handle passed into the web handlers at construction time.
pub type SharedRecordStore = Arc<dyn RecordStore>;

/// Read and decode the link record for a Discord id, if one exists.
pub async fn fetch_record(
    store: &dyn RecordStore,
    discord_id: u64,
) -> Result<Option<LinkRecord>> {
    match store.get(&record_key(discord_id)).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write the link record for a Discord id, overwriting any
/// previous registration.
pub async fn store_record(
    store: &dyn RecordStore,
    discord_id: u64,
    record: &LinkRecord,
) -> Result<()> {
    let raw = serde_json::to_string(record)?;
    store.set(&record_key(discord_id), &raw).await
}
