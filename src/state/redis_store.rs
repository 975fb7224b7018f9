//! Redis-backed record store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use super::record_store::RecordStore;
use crate::error::Result;

/// Store connection parameters, read once at startup.
pub struct RedisConfig {
    /// Host or host:port of the redis server
    pub host: String,
    /// Password, if the server requires one
    pub password: Option<String>,
}

impl RedisConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            password: std::env::var("REDIS_PASSWORD").ok(),
        }
    }

    fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}/", password, self.host),
            None => format!("redis://{}/", self.host),
        }
    }
}

/// Record store over a multiplexed Redis connection.
///
/// The `ConnectionManager` is created once at startup and cloned per
/// operation; clones share the underlying connection and reconnect after
/// errors.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url())?;
        let manager = ConnectionManager::new(client).await?;
        debug!("Connected to redis at {}", config.host);
        Ok(Self { manager })
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_url() {
        let plain = RedisConfig {
            host: "127.0.0.1".to_string(),
            password: None,
        };
        assert_eq!(plain.url(), "redis://127.0.0.1/");

        let secured = RedisConfig {
            host: "cache.internal:6380".to_string(),
            password: Some("hunter2".to_string()),
        };
        assert_eq!(secured.url(), "redis://:hunter2@cache.internal:6380/");
    }
}
