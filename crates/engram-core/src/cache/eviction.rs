//! Eviction policies
//!
//! Policies are pure: given a snapshot of local entries and a number of bytes
//! to reclaim, they return the `hash_key`s to evict, in eviction order.
//! Expired entries are never selected — expiry cleanup runs as a separate
//! step before eviction.

use chrono::{DateTime, Utc};

use super::entry::CacheEntry;

/// Relative weight of idle time in the adaptive score
const RECENCY_WEIGHT: f64 = 1.0;
/// Relative weight of inverse access frequency in the adaptive score
const FREQUENCY_WEIGHT: f64 = 1.0;
/// Relative weight of entry size (MB) in the adaptive score
const SIZE_WEIGHT: f64 = 1.0;
/// Relative weight of entry age (days) in the adaptive score
const AGE_WEIGHT: f64 = 1.0;

/// Strategy for choosing eviction victims under capacity pressure
pub trait EvictionPolicy: Send + Sync {
    /// Capacity ceiling this policy enforces, in bytes
    fn max_size_bytes(&self) -> u64;

    /// Select entries to evict, in order, until `required_space` bytes are
    /// covered
    ///
    /// Skips expired entries. If the non-expired entries cannot cover
    /// `required_space`, every non-expired entry is returned (best effort).
    /// Ties preserve the input order, so selection is deterministic.
    fn select_candidates(&self, entries: &[CacheEntry], required_space: u64) -> Vec<String>;
}

/// Which eviction policy a cache is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicyKind {
    /// Least recently used first
    Lru,
    /// Least frequently used first
    Lfu,
    /// Blended recency/frequency/size/age score
    Adaptive,
}

impl EvictionPolicyKind {
    /// Build the policy for this kind with the given capacity ceiling
    pub fn build(self, max_size_bytes: u64) -> Box<dyn EvictionPolicy> {
        match self {
            Self::Lru => Box::new(LruPolicy::new(max_size_bytes)),
            Self::Lfu => Box::new(LfuPolicy::new(max_size_bytes)),
            Self::Adaptive => Box::new(AdaptivePolicy::new(max_size_bytes)),
        }
    }
}

/// Evicts the entries with the oldest `last_accessed` first
#[derive(Debug, Clone)]
pub struct LruPolicy {
    max_size_bytes: u64,
}

impl LruPolicy {
    /// Create an LRU policy with the given capacity ceiling
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }
}

impl EvictionPolicy for LruPolicy {
    fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    fn select_candidates(&self, entries: &[CacheEntry], required_space: u64) -> Vec<String> {
        let mut live = live_entries(entries);
        live.sort_by(|a, b| a.last_accessed.cmp(&b.last_accessed));
        take_until(&live, required_space)
    }
}

/// Evicts the entries with the lowest `access_count` first
#[derive(Debug, Clone)]
pub struct LfuPolicy {
    max_size_bytes: u64,
}

impl LfuPolicy {
    /// Create an LFU policy with the given capacity ceiling
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }
}

impl EvictionPolicy for LfuPolicy {
    fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    fn select_candidates(&self, entries: &[CacheEntry], required_space: u64) -> Vec<String> {
        let mut live = live_entries(entries);
        live.sort_by(|a, b| a.access_count.cmp(&b.access_count));
        take_until(&live, required_space)
    }
}

/// Evicts by a blended score of recency, frequency, size, and age
///
/// Large, stale, rarely-used entries score highest and go first; small, hot,
/// recently-created entries score lowest and survive.
#[derive(Debug, Clone)]
pub struct AdaptivePolicy {
    max_size_bytes: u64,
}

impl AdaptivePolicy {
    /// Create an adaptive policy with the given capacity ceiling
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    fn score(entry: &CacheEntry, now: DateTime<Utc>) -> f64 {
        let hours_idle = (now - entry.last_accessed).num_seconds().max(0) as f64 / 3600.0;
        let inverse_frequency = 1.0 / (entry.access_count as f64 + 1.0);
        let size_mb = entry.size_bytes as f64 / (1024.0 * 1024.0);
        let age_days = (now - entry.created_at).num_seconds().max(0) as f64 / 86_400.0;

        RECENCY_WEIGHT * hours_idle
            + FREQUENCY_WEIGHT * inverse_frequency
            + SIZE_WEIGHT * size_mb
            + AGE_WEIGHT * age_days
    }
}

impl EvictionPolicy for AdaptivePolicy {
    fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    fn select_candidates(&self, entries: &[CacheEntry], required_space: u64) -> Vec<String> {
        let now = Utc::now();
        let mut scored: Vec<(f64, &CacheEntry)> = live_entries(entries)
            .into_iter()
            .map(|entry| (Self::score(entry, now), entry))
            .collect();

        // Highest score evicted first; stable sort keeps ties deterministic
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let ordered: Vec<&CacheEntry> = scored.into_iter().map(|(_, entry)| entry).collect();
        take_until(&ordered, required_space)
    }
}

/// Filter out expired entries, preserving input order
fn live_entries(entries: &[CacheEntry]) -> Vec<&CacheEntry> {
    entries.iter().filter(|e| !e.is_expired()).collect()
}

/// Take candidates in order until their cumulative size covers
/// `required_space`
fn take_until(ordered: &[&CacheEntry], required_space: u64) -> Vec<String> {
    let mut selected = Vec::new();
    let mut reclaimed = 0u64;

    for entry in ordered {
        if reclaimed >= required_space {
            break;
        }
        reclaimed += entry.size_bytes;
        selected.push(entry.hash_key.clone());
    }

    selected
}
