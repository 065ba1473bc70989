//! In-memory key-value store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::EngramResult;

/// A stored payload plus its optional expiry
#[derive(Debug, Clone)]
struct StoredValue {
    payload: String,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() > exp)
    }
}

/// In-memory [`KeyValueStore`] with TTL support
///
/// Single-process stand-in for the shared tier. Used as the injectable
/// test double and for deployments that run without a Redis instance.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> EngramResult<Option<String>> {
        let mut entries = self.entries.write().await;

        let expired = entries.get(key).is_some_and(StoredValue::is_expired);
        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|stored| stored.payload.clone()))
    }

    async fn set(&self, key: &str, value: &str) -> EngramResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            StoredValue {
                payload: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &str) -> EngramResult<()> {
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl_secs as i64);
        self.entries.write().await.insert(
            key.to_string(),
            StoredValue {
                payload: value.to_string(),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> EngramResult<u64> {
        let removed = self.entries.write().await.remove(key);
        Ok(u64::from(removed.is_some()))
    }
}
