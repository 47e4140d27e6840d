//! Model validation errors.

use thiserror::Error;

/// Errors raised by strict model validation.
///
/// The query engine itself never raises these — malformed filter nodes
/// degrade to match-all there — but controllers that prefer rejecting bad
/// payloads outright can call the `validate` helpers and surface them.
#[derive(Debug, Error)]
pub enum Error {
    /// A field name required by the node's field kind is missing or empty.
    #[error("filter node is missing {0}")]
    MissingField(&'static str),

    /// A navigation/collection path is not a one-level dotted path.
    #[error("invalid navigation path: {0:?}")]
    InvalidPath(String),
}
