//! Gridstore - Paginated, filterable data access with multi-level caching.
//!
//! This crate re-exports the full stack: serializable query inputs
//! ([`model`]), the store-agnostic query engine and repository traits
//! (from `gridstore-core`), and the optional multi-level cache (behind
//! the `cache` feature, on by default).
//!
//! Records implement [`FieldAccess`] to expose fields by name and
//! [`Entity`] to identify themselves; any [`RecordSource`] then gets
//! filtering, sorting, and pagination for free:
//!
//! ```
//! use gridstore::{Entity, FieldAccess, FieldValue, MemoryStore, Repository};
//! use gridstore::model::{FilterNode, QueryOptions, Value};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct City {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl FieldAccess for City {
//!     fn field(&self, name: &str) -> Option<FieldValue<'_>> {
//!         match name {
//!             "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
//!             "Name" => Some(FieldValue::Scalar(Value::String(self.name.clone()))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl Entity for City {
//!     const NAME: &'static str = "City";
//!
//!     fn id(&self) -> Value {
//!         Value::Int(self.id)
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemoryStore::with_records(vec![
//!     City { id: 1, name: "Berlin".into() },
//!     City { id: 2, name: "Bergen".into() },
//!     City { id: 3, name: "Madrid".into() },
//! ]);
//!
//! let page = store
//!     .query(
//!         &QueryOptions::first_page(),
//!         Some(&FilterNode::contains("Name", "Ber")),
//!     )
//!     .await;
//!
//! assert_eq!(page.total_count, 2);
//! assert!(page.is_filtered);
//! # }
//! ```

pub use gridstore_core::{
    Entity, FieldAccess, FieldValue, MemoryStore, QueryEngine, RecordSource, Repository,
    StoreError, TreeEntity, TreeRepository, TreeSource, MAX_TREE_DEPTH,
};

/// Query inputs and results: filter trees, paging options, pages.
pub use gridstore_model as model;

pub use gridstore_model::{
    FilterNode, QueryOptions, ResultPage, SaveMode, SortDirection, Value,
};

/// Multi-level caching, re-exported behind the `cache` feature.
#[cfg(feature = "cache")]
pub use gridstore_cache as cache;

#[cfg(feature = "cache")]
pub use gridstore_cache::{CacheConfig, CachedRepository, MultiLevelCache};
