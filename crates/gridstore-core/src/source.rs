//! Record source traits: the seam between the engine and storage.
//!
//! A source only knows how to hand over candidate records. Filtering,
//! sorting, and pagination are the engine's job, so any backend that can
//! enumerate records plugs in here.

use async_trait::async_trait;
use gridstore_model::Value;

use crate::entity::{Entity, TreeEntity};
use crate::error::StoreError;

/// Supplies candidate records for flat queries.
#[async_trait]
pub trait RecordSource<R: Entity>: Send + Sync {
    /// Load every candidate record of the entity type.
    async fn scan(&self) -> Result<Vec<R>, StoreError>;
}

/// Supplies parent/child lookups for tree queries.
#[async_trait]
pub trait TreeSource<R: TreeEntity>: RecordSource<R> {
    /// Load the direct children of the record with the given id.
    async fn children_of(&self, parent: &Value) -> Result<Vec<R>, StoreError>;
}
