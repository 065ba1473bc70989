//! Two-tier cache storage

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::entry::CacheEntry;
use super::key::CacheKey;
use super::metrics::{CacheMetrics, CacheStatsSnapshot};
use crate::store::SharedStore;

/// Two-tier cache store
///
/// Hot reads are served from a local in-process map; the injected
/// [`crate::store::KeyValueStore`] provides durability and cross-process
/// visibility. Every failure at the shared-tier boundary is caught here and
/// degraded to a miss or a failed write — callers never see an error.
pub struct CacheStorage {
    /// Prefix for every shared-tier key
    namespace_prefix: String,
    /// Local tier, keyed by `hash_key`
    local: RwLock<HashMap<String, CacheEntry>>,
    /// Shared durable tier
    shared: SharedStore,
    /// Counters for this instance's local tier
    metrics: RwLock<CacheMetrics>,
}

impl CacheStorage {
    /// Create a storage over `shared`, prefixing its keys with
    /// `namespace_prefix`
    pub fn new(shared: SharedStore, namespace_prefix: impl Into<String>) -> Self {
        Self {
            namespace_prefix: namespace_prefix.into(),
            local: RwLock::new(HashMap::new()),
            shared,
            metrics: RwLock::new(CacheMetrics::default()),
        }
    }

    fn shared_key(&self, hash_key: &str) -> String {
        format!("{}:{}", self.namespace_prefix, hash_key)
    }

    /// Look up an entry, checking the local tier first
    ///
    /// A shared-tier hit is promoted into the local tier. Expired copies are
    /// dropped from whichever tier holds them and the lookup falls through.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        // Local tier
        {
            let mut local = self.local.write().await;
            if let Some(mut entry) = local.get(&key.hash_key).cloned() {
                if entry.is_expired() {
                    local.remove(&key.hash_key);
                    self.metrics
                        .write()
                        .await
                        .record_invalidation(entry.size_bytes);
                } else {
                    entry.mark_accessed();
                    local.insert(key.hash_key.clone(), entry.clone());
                    self.metrics.write().await.record_hit(entry.size_bytes);
                    return Some(entry);
                }
            }
        }

        // Shared tier
        match self.shared.get(&self.shared_key(&key.hash_key)).await {
            Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(mut entry) => {
                    if entry.is_expired() {
                        if let Err(err) = self.shared.delete(&self.shared_key(&key.hash_key)).await
                        {
                            warn!("Failed to delete expired shared entry: {}", err);
                        }
                    } else {
                        entry.mark_accessed();
                        self.promote(entry.clone()).await;
                        self.metrics.write().await.record_hit(entry.size_bytes);
                        return Some(entry);
                    }
                }
                Err(err) => {
                    warn!("Discarding malformed shared cache entry: {}", err);
                }
            },
            Ok(None) => {}
            Err(err) => {
                warn!("Shared tier read failed, treating as miss: {}", err);
            }
        }

        self.metrics.write().await.record_miss();
        None
    }

    /// Cache a shared-tier hit into the local tier
    async fn promote(&self, entry: CacheEntry) {
        let mut local = self.local.write().await;
        let mut metrics = self.metrics.write().await;

        let size_bytes = entry.size_bytes;
        if let Some(old) = local.insert(entry.hash_key.clone(), entry) {
            metrics.total_size_bytes = metrics.total_size_bytes.saturating_sub(old.size_bytes);
            metrics.total_size_bytes += size_bytes;
        } else {
            metrics.record_store(size_bytes);
        }
    }

    /// Store a value under `key` in both tiers
    ///
    /// Returns `false` when the value cannot be serialized, or when the
    /// shared-tier write fails — the local tier keeps the entry in the latter
    /// case, so local-only caching continues while the shared store is down.
    pub async fn set<T>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
        tags: HashSet<String>,
    ) -> bool
    where
        T: Serialize + ?Sized,
    {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!("Refusing to cache unserializable value: {}", err);
                return false;
            }
        };

        let entry = CacheEntry::new(key, value, ttl, tags);
        let payload = match serde_json::to_string(&entry) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to serialize cache entry: {}", err);
                return false;
            }
        };

        {
            let mut local = self.local.write().await;
            let mut metrics = self.metrics.write().await;

            if let Some(old) = local.insert(key.hash_key.clone(), entry.clone()) {
                metrics.total_size_bytes = metrics.total_size_bytes.saturating_sub(old.size_bytes);
                metrics.total_size_bytes += entry.size_bytes;
            } else {
                metrics.record_store(entry.size_bytes);
            }
        }

        let shared_key = self.shared_key(&key.hash_key);
        let result = match ttl {
            Some(ttl) => {
                self.shared
                    .setex(&shared_key, ttl.as_secs().max(1), &payload)
                    .await
            }
            None => self.shared.set(&shared_key, &payload).await,
        };

        match result {
            Ok(()) => {
                debug!("Cached entry {} ({} bytes)", key.key, entry.size_bytes);
                true
            }
            Err(err) => {
                warn!("Shared tier write failed for {}: {}", key.key, err);
                false
            }
        }
    }

    /// Remove an entry from both tiers
    ///
    /// Returns `true` iff the shared tier reported a key removed.
    pub async fn delete(&self, key: &CacheKey) -> bool {
        if let Some(old) = self.local.write().await.remove(&key.hash_key) {
            self.metrics
                .write()
                .await
                .record_invalidation(old.size_bytes);
        }

        match self.shared.delete(&self.shared_key(&key.hash_key)).await {
            Ok(removed) => removed > 0,
            Err(err) => {
                warn!("Shared tier delete failed for {}: {}", key.key, err);
                false
            }
        }
    }

    /// Remove a local entry under capacity pressure
    ///
    /// Returns `true` iff the local tier held the entry. A failed shared-tier
    /// delete is logged and otherwise ignored: the orphan lingers there until
    /// its TTL clears it.
    pub(crate) async fn evict(&self, hash_key: &str) -> bool {
        let removed = self.local.write().await.remove(hash_key);
        if let Some(entry) = &removed {
            self.metrics.write().await.record_eviction(entry.size_bytes);
        }

        if let Err(err) = self.shared.delete(&self.shared_key(hash_key)).await {
            warn!("Shared tier delete failed during eviction: {}", err);
        }

        removed.is_some()
    }

    /// Remove every local entry whose tag set intersects `tags`
    ///
    /// Only scans the local tier: entries that were evicted locally but still
    /// live in the shared tier are not found here and age out via TTL.
    /// Returns the number of entries removed.
    pub async fn invalidate_by_tags(&self, tags: &[String]) -> usize {
        let victims: Vec<CacheEntry> = {
            let mut local = self.local.write().await;
            let mut metrics = self.metrics.write().await;

            let matching: Vec<String> = local
                .values()
                .filter(|entry| entry.has_any_tag(tags))
                .map(|entry| entry.hash_key.clone())
                .collect();

            matching
                .iter()
                .filter_map(|hash_key| {
                    let entry = local.remove(hash_key)?;
                    metrics.record_invalidation(entry.size_bytes);
                    Some(entry)
                })
                .collect()
        };

        for entry in &victims {
            if let Err(err) = self.shared.delete(&self.shared_key(&entry.hash_key)).await {
                warn!(
                    "Shared tier delete failed during tag invalidation of {}: {}",
                    entry.key, err
                );
            }
        }

        if !victims.is_empty() {
            debug!("Invalidated {} entries by tags {:?}", victims.len(), tags);
        }
        victims.len()
    }

    /// Remove expired entries from the local tier, returning the count
    pub async fn cleanup_expired(&self) -> usize {
        let mut local = self.local.write().await;
        let mut metrics = self.metrics.write().await;

        let expired: Vec<String> = local
            .values()
            .filter(|entry| entry.is_expired())
            .map(|entry| entry.hash_key.clone())
            .collect();

        for hash_key in &expired {
            if let Some(entry) = local.remove(hash_key) {
                metrics.record_invalidation(entry.size_bytes);
            }
        }

        if !expired.is_empty() {
            debug!("Cleaned up {} expired cache entries", expired.len());
        }
        expired.len()
    }

    /// Drop every local entry and reset the metrics
    ///
    /// The shared tier is untouched, consistent with the local scoping of
    /// [`Self::invalidate_by_tags`].
    pub async fn clear(&self) {
        self.local.write().await.clear();
        *self.metrics.write().await = CacheMetrics::default();
    }

    /// Snapshot of the current metrics
    pub async fn stats(&self) -> CacheStatsSnapshot {
        self.metrics.read().await.snapshot()
    }

    /// Clone of the raw metrics counters
    pub async fn metrics(&self) -> CacheMetrics {
        self.metrics.read().await.clone()
    }

    /// Snapshot of every entry resident in the local tier
    pub async fn local_entries(&self) -> Vec<CacheEntry> {
        self.local.read().await.values().cloned().collect()
    }

    /// Number of entries in the local tier
    pub async fn len(&self) -> usize {
        self.local.read().await.len()
    }

    /// Check if the local tier is empty
    pub async fn is_empty(&self) -> bool {
        self.local.read().await.is_empty()
    }
}
