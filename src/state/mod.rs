//! Persisted link records and the key-value store seam.

#[cfg(test)]
pub mod memory;
pub mod record_store;
pub mod redis_store;

pub use record_store::{
    fetch_record, record_key, store_record, RecordStore, SharedRecordStore,
};
pub use redis_store::{RedisConfig, RedisStore};
