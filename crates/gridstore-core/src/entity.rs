//! Entity traits: how the engine reads fields off application records.
//!
//! The engine never reflects over concrete types. A record exposes its
//! queryable surface through [`FieldAccess`], and the entity traits layer
//! identity and tree structure on top. Filters and sorts resolve field
//! names against this surface at evaluation time, so a filter referencing
//! an unknown field simply never matches instead of failing the query.

use gridstore_model::Value;
use serde::{de::DeserializeOwned, Serialize};

/// A field looked up on a record by name.
///
/// Borrows from the record it was read from, so navigation and collection
/// lookups cost nothing beyond the pointer chase.
pub enum FieldValue<'a> {
    /// A plain scalar column.
    Scalar(Value),
    /// A to-one reference. `None` means the reference is unset (a null
    /// foreign key); predicates over it never match.
    Nav(Option<&'a dyn FieldAccess>),
    /// A to-many collection. Predicates over it match existentially.
    Many(Vec<&'a dyn FieldAccess>),
}

/// Name-based field lookup on a record.
///
/// Returns `None` for field names the record does not expose. Implementors
/// should use the exact field names the client sends in filter payloads.
pub trait FieldAccess {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A queryable record type.
///
/// `NAME` must be unique across all entity types sharing a cache namespace,
/// since it prefixes cache keys and scopes invalidation.
pub trait Entity:
    FieldAccess + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Stable entity name, e.g. `"Device"`.
    const NAME: &'static str;

    /// Primary key value of this record.
    fn id(&self) -> Value;

    /// Field holding the creation timestamp, if the entity has one.
    ///
    /// Queries without an explicit sort order by this field descending,
    /// so newest records appear first. Entities without one fall back to
    /// ascending id order.
    fn created_field() -> Option<&'static str> {
        None
    }
}

/// An entity arranged in a parent/child hierarchy.
///
/// Records with no parent are roots. Tree queries paginate over roots and
/// then materialize each root's descendants.
pub trait TreeEntity: Entity {
    /// Parent record id, or `None` for a root.
    fn parent_id(&self) -> Option<Value>;
}

impl<'a> FieldValue<'a> {
    /// The scalar value, if this field is one.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }
}
