//! Cache entry record

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::key::CacheKey;

/// A cached value plus its bookkeeping
///
/// This is the persisted record format: the same serialization is written to
/// the shared tier and held in the local map, so the two tiers can transiently
/// disagree on `access_count`/`last_accessed` (the local copy is fresher).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Human-readable composite key
    pub key: String,
    /// Storage digest shared by both tiers
    pub hash_key: String,
    /// The cached payload
    pub value: serde_json::Value,
    /// Byte length of the serialized payload
    pub size_bytes: u64,
    /// Number of successful reads served by this entry
    pub access_count: u64,
    /// When this entry was last read
    pub last_accessed: DateTime<Utc>,
    /// When this entry was created
    pub created_at: DateTime<Utc>,
    /// When this entry expires; `None` means no TTL expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// Free-form tags for bulk invalidation, by convention `prefix:value`
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Open metadata mapping
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CacheEntry {
    /// Create a new entry for `key` holding `value`
    pub fn new(
        key: &CacheKey,
        value: serde_json::Value,
        ttl: Option<Duration>,
        tags: HashSet<String>,
    ) -> Self {
        let now = Utc::now();
        let expires_at = ttl
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| now + d);
        let size_bytes = value.to_string().len() as u64;

        Self {
            key: key.key.clone(),
            hash_key: key.hash_key.clone(),
            value,
            size_bytes,
            access_count: 0,
            last_accessed: now,
            created_at: now,
            expires_at,
            tags,
            metadata: HashMap::new(),
        }
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => false,
        }
    }

    /// Mark the entry as accessed
    pub fn mark_accessed(&mut self) {
        self.access_count += 1;
        self.last_accessed = Utc::now();
    }

    /// Check whether any of `tags` appears in this entry's tag set
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.tags.contains(tag))
    }

    /// Get the age of the entry
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.created_at
    }

    /// Time remaining until expiry, if a TTL is set
    pub fn time_to_expiry(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|expires_at| expires_at - Utc::now())
    }
}
