//! Error types for record stores and the query engine.

use thiserror::Error;

/// Errors surfaced by record sources and repositories.
///
/// Query paths swallow these (a failed query yields an empty page);
/// mutation paths propagate them to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying backend failed (connection, I/O, driver error).
    #[error("backend error: {0}")]
    Backend(String),

    /// An update referenced a record id that does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// An insert supplied a record id that already exists.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Wrap an arbitrary backend failure.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}
