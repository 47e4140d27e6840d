//! Repository traits: the full data-access surface a table UI talks to.

use async_trait::async_trait;
use gridstore_model::{FilterNode, QueryOptions, ResultPage, SaveMode, Value};

use crate::entity::{Entity, TreeEntity};
use crate::error::StoreError;

/// Read and write access to one entity type.
///
/// Queries are infallible by contract: any failure is logged and surfaces
/// as an empty page, so a broken backend degrades the grid instead of
/// breaking it. Mutations do propagate errors, since the caller must know
/// whether a write happened.
#[async_trait]
pub trait Repository<R: Entity>: Send + Sync {
    /// Run a paginated flat query.
    async fn query(&self, options: &QueryOptions, filter: Option<&FilterNode>) -> ResultPage<R>;

    /// Insert (`SaveMode::Add`) or replace (`SaveMode::Update`) records.
    /// Returns the number of records written.
    async fn save(&self, records: Vec<R>, mode: SaveMode) -> Result<u64, StoreError>;

    /// Delete records by id. Ids with no matching record are ignored.
    /// Returns the number of records removed.
    async fn delete(&self, ids: &[Value]) -> Result<u64, StoreError>;
}

/// Tree-query access for hierarchical entities.
#[async_trait]
pub trait TreeRepository<R: TreeEntity>: Repository<R> {
    /// Run a paginated tree query: roots are paged and filtered, and each
    /// returned root brings its whole subtree along.
    async fn query_tree(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
    ) -> ResultPage<R>;
}
