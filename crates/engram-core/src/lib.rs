//! Engram core library
//!
//! Two-tier caching layer for async agent backends: a hot in-process tier
//! backed by a shared key-value store (Redis in production), with
//! content-addressed keys, TTL expiry, tag-based invalidation, and pluggable
//! eviction policies.
//!
//! The cache is designed to fail open — shared-tier outages and
//! serialization trouble degrade to cache misses, never to errors in the
//! calling agent.

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod store;

// Re-export commonly used types
pub use cache::{
    AdaptivePolicy, CacheEntry, CacheKey, CacheKind, CacheMetrics, CacheStatsSnapshot,
    CacheStorage, EvictionPolicy, EvictionPolicyKind, LfuPolicy, LruPolicy, content_hash,
    params_hash,
};
pub use config::CacheConfig;
pub use error::{EngramError, EngramResult};
pub use manager::{
    AgentCacheManager, AgentCacheManagerBuilder, CleanupReport, ResponseParams,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
pub use store::{KeyValueStore, MemoryStore, RedisConfig, RedisStore, SharedStore};
