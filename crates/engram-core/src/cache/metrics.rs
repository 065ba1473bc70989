//! Cache metrics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Running counters for one [`super::CacheStorage`] instance
///
/// `total_size_bytes` and `entry_count` track only entries currently resident
/// in the local tier; the shared tier is not counted here.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
    /// Entries removed under capacity pressure
    pub evictions: u64,
    /// Entries removed by expiry, explicit delete, or tag invalidation
    pub invalidations: u64,
    /// Bytes held in the local tier
    pub total_size_bytes: u64,
    /// Entries held in the local tier
    pub entry_count: usize,
    /// When this metrics instance started counting
    pub started_at: DateTime<Utc>,
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self {
            hits: 0,
            misses: 0,
            evictions: 0,
            invalidations: 0,
            total_size_bytes: 0,
            entry_count: 0,
            started_at: Utc::now(),
        }
    }
}

impl CacheMetrics {
    /// Record a successful read of `size_bytes`
    pub fn record_hit(&mut self, _size_bytes: u64) {
        self.hits += 1;
    }

    /// Record a failed read
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Record a new entry entering the local tier
    pub fn record_store(&mut self, size_bytes: u64) {
        self.entry_count += 1;
        self.total_size_bytes += size_bytes;
    }

    /// Record an entry leaving the local tier under capacity pressure
    pub fn record_eviction(&mut self, size_bytes: u64) {
        self.evictions += 1;
        self.entry_count = self.entry_count.saturating_sub(1);
        self.total_size_bytes = self.total_size_bytes.saturating_sub(size_bytes);
    }

    /// Record an entry leaving the local tier by expiry, delete, or tag scan
    pub fn record_invalidation(&mut self, size_bytes: u64) {
        self.invalidations += 1;
        self.entry_count = self.entry_count.saturating_sub(1);
        self.total_size_bytes = self.total_size_bytes.saturating_sub(size_bytes);
    }

    /// Hit ratio in `[0, 1]`; `0.0` before any request
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Take a snapshot with derived fields
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let total_requests = self.hits + self.misses;
        let avg_entry_size_bytes = if self.entry_count == 0 {
            0
        } else {
            self.total_size_bytes / self.entry_count as u64
        };

        let elapsed_secs =
            (Utc::now() - self.started_at).num_milliseconds().max(0) as f64 / 1000.0;
        let requests_per_hour = if elapsed_secs > 0.0 {
            total_requests as f64 * 3600.0 / elapsed_secs
        } else {
            0.0
        };

        CacheStatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            invalidations: self.invalidations,
            entry_count: self.entry_count,
            total_size_bytes: self.total_size_bytes,
            total_requests,
            hit_ratio: self.hit_ratio(),
            avg_entry_size_bytes,
            requests_per_hour,
            started_at: self.started_at,
        }
    }
}

/// Point-in-time view of [`CacheMetrics`] with derived fields
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
    /// Capacity evictions
    pub evictions: u64,
    /// Expiry/delete/tag removals
    pub invalidations: u64,
    /// Entries in the local tier
    pub entry_count: usize,
    /// Bytes in the local tier
    pub total_size_bytes: u64,
    /// Hits plus misses
    pub total_requests: u64,
    /// Hit ratio in `[0, 1]`
    pub hit_ratio: f64,
    /// Mean local entry size, 0 when empty
    pub avg_entry_size_bytes: u64,
    /// Request rate extrapolated over the elapsed wall clock
    pub requests_per_hour: f64,
    /// When counting started
    pub started_at: DateTime<Utc>,
}

impl CacheStatsSnapshot {
    /// Format the snapshot as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "hits: {}, misses: {}, hit ratio: {:.1}%, entries: {}, size: {} bytes",
            self.hits,
            self.misses,
            self.hit_ratio * 100.0,
            self.entry_count,
            self.total_size_bytes
        )
    }
}
