//! Agent-facing cache façade
//!
//! [`AgentCacheManager`] translates agent lookups (responses, embeddings,
//! computation results) into [`CacheKey`]/[`CacheStorage`] operations and
//! orchestrates cache warming, tag-based invalidation, and periodic
//! maintenance. Every method fails open: cache trouble surfaces as a miss, a
//! `false`, or a zero count, never as an error.

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::eviction::EvictionPolicy;
use crate::cache::key::{CacheKey, CacheKind, content_hash, params_hash};
use crate::cache::metrics::CacheStatsSnapshot;
use crate::cache::storage::CacheStorage;
use crate::config::CacheConfig;
use crate::store::{MemoryStore, SharedStore};

/// Default sampling temperature used in response keys
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default token limit used in response keys
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Generation parameters that participate in response cache keys
///
/// Two requests hit the same cached response only when the input text, model,
/// and these parameters all match.
#[derive(Debug, Clone)]
pub struct ResponseParams {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Token limit
    pub max_tokens: u32,
}

impl ResponseParams {
    /// Create parameters for `model` with the default temperature and limit
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Counts returned by [`AgentCacheManager::periodic_cleanup`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired entries removed from the local tier
    pub expired_removed: usize,
    /// Entries evicted under capacity pressure
    pub evicted: usize,
}

/// Domain façade over [`CacheStorage`] for agent workloads
pub struct AgentCacheManager {
    storage: CacheStorage,
    policy: Box<dyn EvictionPolicy>,
    default_response_ttl: Duration,
    default_embedding_ttl: Duration,
    default_computation_ttl: Duration,
    auto_cleanup_interval: Duration,
    last_cleanup: RwLock<Option<DateTime<Utc>>>,
}

impl AgentCacheManager {
    /// Create a manager over `store` with the given configuration
    pub fn new(store: SharedStore, config: CacheConfig) -> Self {
        let storage = CacheStorage::new(store, config.namespace_prefix.clone());
        let policy = config.eviction_policy.build(config.max_size_bytes);

        Self {
            storage,
            policy,
            default_response_ttl: config.default_response_ttl,
            default_embedding_ttl: config.default_embedding_ttl,
            default_computation_ttl: config.default_computation_ttl,
            auto_cleanup_interval: config.auto_cleanup_interval,
            last_cleanup: RwLock::new(None),
        }
    }

    /// Access the underlying storage
    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    fn response_key(&self, agent_id: &str, input_text: &str, params: &ResponseParams) -> CacheKey {
        CacheKey::new(
            format!("agent:{agent_id}"),
            CacheKind::Response,
            [
                ("input_hash", content_hash(input_text)),
                ("model", params.model.clone()),
                ("temperature", params.temperature.to_string()),
                ("max_tokens", params.max_tokens.to_string()),
            ],
        )
    }

    fn embedding_key(&self, text: &str, model: &str) -> CacheKey {
        CacheKey::new(
            "embeddings",
            CacheKind::Embedding,
            [("content_hash", content_hash(&format!("{text}:{model}")))],
        )
    }

    fn computation_key(&self, computation_id: &str, parameters: &serde_json::Value) -> CacheKey {
        CacheKey::new(
            "computations",
            CacheKind::Computation,
            [
                ("computation_id", computation_id.to_string()),
                ("params_hash", params_hash(parameters)),
            ],
        )
    }

    /// Get a cached agent response
    pub async fn get_cached_response(
        &self,
        agent_id: &str,
        input_text: &str,
        params: &ResponseParams,
    ) -> Option<serde_json::Value> {
        let key = self.response_key(agent_id, input_text, params);
        self.storage.get(&key).await.map(|entry| entry.value)
    }

    /// Cache an agent response
    ///
    /// `ttl` defaults to the configured response TTL. Entries are tagged
    /// `agent:{id}`, `model:{name}`, and `response_cache` for bulk
    /// invalidation.
    pub async fn cache_response<T>(
        &self,
        agent_id: &str,
        input_text: &str,
        response: &T,
        params: &ResponseParams,
        ttl: Option<Duration>,
    ) -> bool
    where
        T: Serialize + ?Sized,
    {
        let key = self.response_key(agent_id, input_text, params);
        let tags = HashSet::from([
            format!("agent:{agent_id}"),
            format!("model:{}", params.model),
            "response_cache".to_string(),
        ]);
        let ttl = ttl.or(Some(self.default_response_ttl));
        self.storage.set(&key, response, ttl, tags).await
    }

    /// Get a cached embedding for `text` under `model`
    pub async fn get_cached_embedding(&self, text: &str, model: &str) -> Option<serde_json::Value> {
        let key = self.embedding_key(text, model);
        self.storage.get(&key).await.map(|entry| entry.value)
    }

    /// Cache an embedding; `ttl` defaults to the configured embedding TTL
    pub async fn cache_embedding<T>(
        &self,
        text: &str,
        model: &str,
        embedding: &T,
        ttl: Option<Duration>,
    ) -> bool
    where
        T: Serialize + ?Sized,
    {
        let key = self.embedding_key(text, model);
        let tags = HashSet::from([format!("model:{model}"), "embedding_cache".to_string()]);
        let ttl = ttl.or(Some(self.default_embedding_ttl));
        self.storage.set(&key, embedding, ttl, tags).await
    }

    /// Get a cached computation result
    ///
    /// Parameters are hashed with stable key ordering, so logically equal
    /// parameter maps always address the same entry.
    pub async fn get_cached_computation(
        &self,
        computation_id: &str,
        parameters: &serde_json::Value,
    ) -> Option<serde_json::Value> {
        let key = self.computation_key(computation_id, parameters);
        self.storage.get(&key).await.map(|entry| entry.value)
    }

    /// Cache a computation result; `ttl` defaults to the configured
    /// computation TTL
    pub async fn cache_computation<T>(
        &self,
        computation_id: &str,
        parameters: &serde_json::Value,
        result: &T,
        ttl: Option<Duration>,
    ) -> bool
    where
        T: Serialize + ?Sized,
    {
        let key = self.computation_key(computation_id, parameters);
        let tags = HashSet::from([
            format!("computation:{computation_id}"),
            "computation_cache".to_string(),
        ]);
        let ttl = ttl.or(Some(self.default_computation_ttl));
        self.storage.set(&key, result, ttl, tags).await
    }

    /// Pre-populate the response cache for `common_inputs`
    ///
    /// `produce` supplies the response for inputs that are not already
    /// cached; inputs with a live entry are skipped and not counted. Returns
    /// the number of entries newly populated.
    pub async fn warm_cache<F>(
        &self,
        agent_id: &str,
        common_inputs: &[String],
        model: &str,
        mut produce: F,
    ) -> usize
    where
        F: FnMut(&str) -> serde_json::Value,
    {
        let params = ResponseParams::new(model);
        let mut warmed = 0;

        for input in common_inputs {
            if self
                .get_cached_response(agent_id, input, &params)
                .await
                .is_some()
            {
                continue;
            }

            let response = produce(input);
            if self
                .cache_response(agent_id, input, &response, &params, None)
                .await
            {
                warmed += 1;
            }
        }

        debug!("Warmed {} cache entries for agent {}", warmed, agent_id);
        warmed
    }

    /// Invalidate every cached entry tagged for `agent_id`
    pub async fn invalidate_agent_cache(&self, agent_id: &str) -> usize {
        self.storage
            .invalidate_by_tags(&[format!("agent:{agent_id}")])
            .await
    }

    /// Invalidate every cached entry tagged for `model`
    pub async fn invalidate_model_cache(&self, model: &str) -> usize {
        self.storage
            .invalidate_by_tags(&[format!("model:{model}")])
            .await
    }

    /// Run expiry cleanup and, if over capacity, policy-driven eviction
    ///
    /// Rate-limited to one run per configured cleanup interval; calls inside
    /// the window return a zeroed report without touching the cache.
    pub async fn periodic_cleanup(&self) -> CleanupReport {
        {
            let mut last = self.last_cleanup.write().await;
            if let Some(previous) = *last {
                let since = Utc::now()
                    .signed_duration_since(previous)
                    .to_std()
                    .unwrap_or_default();
                if since < self.auto_cleanup_interval {
                    return CleanupReport::default();
                }
            }
            *last = Some(Utc::now());
        }

        let expired_removed = self.storage.cleanup_expired().await;

        let mut evicted = 0;
        let total_size = self.storage.metrics().await.total_size_bytes;
        let max_size = self.policy.max_size_bytes();

        if total_size > max_size {
            let required_space = total_size - max_size;
            let entries = self.storage.local_entries().await;

            for hash_key in self.policy.select_candidates(&entries, required_space) {
                if self.storage.evict(&hash_key).await {
                    evicted += 1;
                }
            }
        }

        if expired_removed > 0 || evicted > 0 {
            debug!(
                "Periodic cleanup removed {} expired and evicted {} entries",
                expired_removed, evicted
            );
        }

        CleanupReport {
            expired_removed,
            evicted,
        }
    }

    /// Snapshot of the cache metrics
    pub async fn cache_stats(&self) -> CacheStatsSnapshot {
        self.storage.stats().await
    }
}

/// Builder for [`AgentCacheManager`]
pub struct AgentCacheManagerBuilder {
    store: Option<SharedStore>,
    config: CacheConfig,
}

impl AgentCacheManagerBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self {
            store: None,
            config: CacheConfig::default(),
        }
    }

    /// Set the shared store backing the cache
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the cache configuration
    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the manager, defaulting to an in-memory shared store
    pub fn build(self) -> AgentCacheManager {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as SharedStore);
        AgentCacheManager::new(store, self.config)
    }
}

impl Default for AgentCacheManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
