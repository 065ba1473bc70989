//! Error types for the Engram cache

use thiserror::Error;

/// Result type alias for Engram operations
pub type EngramResult<T> = Result<T, EngramError>;

/// Main error type for the Engram cache
///
/// These errors never cross the public cache surface: `CacheStorage` and
/// `AgentCacheManager` catch them at the boundary and degrade to a miss or
/// a failed-write signal instead.
#[derive(Error, Debug, Clone)]
pub enum EngramError {
    /// Shared-tier store errors (connection, command failure)
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngramError {
    /// Create a new store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<serde_json::Error> for EngramError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
