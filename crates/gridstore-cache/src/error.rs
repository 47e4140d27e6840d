//! Cache error types.

use thiserror::Error;

/// Errors surfaced by cache tiers.
///
/// The multi-level cache swallows these per tier (a failing tier is logged
/// and skipped); they only propagate to callers talking to a single tier
/// directly.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The Redis server rejected or failed an operation.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Compression or decompression of an entry failed.
    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),

    /// An entry was read back in a shape the tier cannot decode.
    #[error("corrupt cache entry: {0}")]
    CorruptEntry(String),
}
