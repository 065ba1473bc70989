//! Cache key construction and content hashing

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The kind of cached artifact, partitioning the key space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    /// Agent responses
    Response,
    /// Text embeddings
    Embedding,
    /// Model artifacts
    Model,
    /// Session state
    Session,
    /// Derived computation results
    Computation,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Response => "response",
            Self::Embedding => "embedding",
            Self::Model => "model",
            Self::Session => "session",
            Self::Computation => "computation",
        };
        write!(f, "{name}")
    }
}

/// Deterministic identifier for a cached entry
///
/// Built from a namespace, a [`CacheKind`], and named components. Components
/// are sorted by name before hashing, so two keys built from the same inputs
/// in any order produce the same `hash_key` — the short digest used as the
/// actual storage key in both tiers.
#[derive(Debug, Clone)]
pub struct CacheKey {
    /// Human-readable composite key
    pub key: String,
    /// 16-hex-char digest of `key`, the literal storage key
    pub hash_key: String,
    /// Key namespace, e.g. `agent:abc123`
    pub namespace: String,
    /// Kind of cached artifact
    pub kind: CacheKind,
    /// When this key was constructed
    pub created_at: DateTime<Utc>,
}

impl CacheKey {
    /// Build a key from a namespace, kind, and named components
    pub fn new<I, K, V>(namespace: impl Into<String>, kind: CacheKind, components: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let namespace = namespace.into();

        let mut parts: Vec<(String, String)> = components
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        parts.sort_by(|a, b| a.0.cmp(&b.0));

        let joined = parts
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("|");

        let key = format!("{namespace}:{kind}:{joined}");
        let hash_key = content_hash(&key);

        Self {
            key,
            hash_key,
            namespace,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Short deterministic digest of arbitrary text
///
/// First 8 bytes of the SHA-256, hex encoded. Stable across process
/// restarts, so it is safe to use as a storage key in the shared tier.
pub fn content_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Deterministic digest of a JSON value
///
/// Object keys are sorted recursively before serialization, so two values
/// that differ only in key order hash identically.
pub fn params_hash(params: &serde_json::Value) -> String {
    let canonical = canonicalize_json(params);
    content_hash(&canonical.to_string())
}

/// Canonicalize JSON for consistent hashing
fn canonicalize_json(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| *k);

            let canonical: serde_json::Map<String, serde_json::Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize_json(v)))
                .collect();

            serde_json::Value::Object(canonical)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_json).collect())
        }
        other => other.clone(),
    }
}
