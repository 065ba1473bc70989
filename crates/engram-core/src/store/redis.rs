//! Redis-backed key-value store

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::debug;

use super::KeyValueStore;
use crate::error::{EngramError, EngramResult};

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://localhost:6379`
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl RedisConfig {
    /// Create a config for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Redis-backed [`KeyValueStore`] over a multiplexed async connection
///
/// The connection handle is cheap to clone; each command clones it so the
/// store can be shared behind an `Arc` without extra locking.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to Redis with the given configuration
    pub async fn connect(config: RedisConfig) -> EngramResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| EngramError::store(format!("Redis client error: {e}")))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| EngramError::store(format!("Redis connection error: {e}")))?;

        debug!("Connected to Redis at {}", config.url);
        Ok(Self { conn })
    }

    /// Connect using the default local configuration
    pub async fn connect_default() -> EngramResult<Self> {
        Self::connect(RedisConfig::default()).await
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> EngramResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| EngramError::store(format!("Redis GET error: {e}")))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> EngramResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| EngramError::store(format!("Redis SET error: {e}")))?;
        Ok(())
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> EngramResult<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero TTL
        let ttl_secs = ttl_secs.max(1);
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|e| EngramError::store(format!("Redis SETEX error: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> EngramResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|e| EngramError::store(format!("Redis DEL error: {e}")))?;
        Ok(removed)
    }
}
