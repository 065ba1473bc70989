//! Cache configuration

use std::time::Duration;

use crate::cache::eviction::EvictionPolicyKind;

/// Configuration for the agent cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Capacity ceiling for the local tier, in bytes
    pub max_size_bytes: u64,
    /// Default TTL for cached agent responses
    pub default_response_ttl: Duration,
    /// Default TTL for cached embeddings
    pub default_embedding_ttl: Duration,
    /// Default TTL for cached computation results
    pub default_computation_ttl: Duration,
    /// Prefix for every key written to the shared tier
    pub namespace_prefix: String,
    /// Minimum interval between periodic cleanup runs
    pub auto_cleanup_interval: Duration,
    /// Which eviction policy drives capacity cleanup
    pub eviction_policy: EvictionPolicyKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * 1024 * 1024, // 100MB
            default_response_ttl: Duration::from_secs(3600), // 1 hour
            default_embedding_ttl: Duration::from_secs(86_400), // 24 hours
            default_computation_ttl: Duration::from_secs(3600), // 1 hour
            namespace_prefix: "agent_cache".to_string(),
            auto_cleanup_interval: Duration::from_secs(300), // 5 minutes
            eviction_policy: EvictionPolicyKind::Lru,
        }
    }
}

impl CacheConfig {
    /// Set the local-tier capacity ceiling
    pub fn with_max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Set the default response TTL
    pub fn with_response_ttl(mut self, ttl: Duration) -> Self {
        self.default_response_ttl = ttl;
        self
    }

    /// Set the default embedding TTL
    pub fn with_embedding_ttl(mut self, ttl: Duration) -> Self {
        self.default_embedding_ttl = ttl;
        self
    }

    /// Set the default computation TTL
    pub fn with_computation_ttl(mut self, ttl: Duration) -> Self {
        self.default_computation_ttl = ttl;
        self
    }

    /// Set the shared-tier key prefix
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    /// Set the minimum interval between periodic cleanup runs
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.auto_cleanup_interval = interval;
        self
    }

    /// Set the eviction policy
    pub fn with_eviction_policy(mut self, policy: EvictionPolicyKind) -> Self {
        self.eviction_policy = policy;
        self
    }
}
