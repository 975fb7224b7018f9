//! In-memory record store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::record_store::RecordStore;
use crate::error::Result;

/// HashMap-backed store with a switchable liveness flag, so callback tests
/// can simulate an unreachable store deterministically.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
    down: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping` report the store as unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.records
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn ping(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}
