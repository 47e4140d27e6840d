//! Deterministic cache-key fingerprinting.
//!
//! Every distinct logical query maps to exactly one key, so two callers
//! issuing the same request share a cache entry and invalidation can
//! address all entries of one entity type by prefix. Keys look like
//! `{namespace}:{EntityName}:{fingerprint}` where the fingerprint is a
//! blake3 hash over the canonical JSON of the query parts.

use gridstore_core::Entity;
use gridstore_model::{FilterNode, QueryOptions};
use serde::Serialize;

use crate::error::CacheError;

/// Builds cache keys, prefixes, and invalidation patterns.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    namespace: String,
}

/// The query parts that make two requests "the same query".
///
/// Serialized with a fixed field order, so the resulting JSON — and with
/// it the hash — is canonical. Filter values participate: the same shape
/// with a different match value is a different result set and must not
/// share an entry. Child order is hashed as given; callers that reorder
/// children get distinct keys, which costs a duplicate entry but never a
/// wrong hit.
#[derive(Serialize)]
struct Fingerprint<'a> {
    tree: bool,
    options: &'a QueryOptions,
    filter: Option<&'a FilterNode>,
}

impl KeyGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Key for one query against one entity type.
    pub fn entity_key<R: Entity>(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
        tree: bool,
    ) -> Result<String, CacheError> {
        let payload = serde_json::to_vec(&Fingerprint {
            tree,
            options,
            filter,
        })?;
        let digest = blake3::hash(&payload);
        Ok(format!(
            "{}:{}:{}",
            self.namespace,
            R::NAME,
            hex::encode(digest.as_bytes())
        ))
    }

    /// Prefix shared by every key of one entity type.
    pub fn entity_prefix<R: Entity>(&self) -> String {
        format!("{}:{}:", self.namespace, R::NAME)
    }

    /// Glob pattern matching every key of one entity type.
    pub fn pattern<R: Entity>(&self) -> String {
        let mut pattern = self.entity_prefix::<R>();
        pattern.push('*');
        pattern
    }
}
