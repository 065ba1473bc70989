//! Caching primitives
//!
//! This module provides the building blocks of the two-tier agent cache:
//!
//! - **Keys**: content-addressed, deterministic identifiers ([`CacheKey`])
//! - **Entries**: values plus bookkeeping and TTL state ([`CacheEntry`])
//! - **Metrics**: per-storage counters ([`CacheMetrics`])
//! - **Eviction**: pluggable victim selection ([`EvictionPolicy`])
//! - **Storage**: the local + shared tier store ([`CacheStorage`])

pub mod entry;
pub mod eviction;
pub mod key;
pub mod metrics;
pub mod storage;


pub use entry::CacheEntry;
pub use eviction::{AdaptivePolicy, EvictionPolicy, EvictionPolicyKind, LfuPolicy, LruPolicy};
pub use key::{CacheKey, CacheKind, content_hash, params_hash};
pub use metrics::{CacheMetrics, CacheStatsSnapshot};
pub use storage::CacheStorage;
