//! Gridstore model types.
//!
//! This crate defines the serializable types shared between the table UI,
//! the query engine, and the cache layer:
//!
//! - [`value`] - scalar runtime values for comparisons and identifiers
//! - [`filter`] - the recursive, composable filter tree
//! - [`options`] - paging and sorting options
//! - [`page`] - the materialized result page
//! - [`request`] - HTTP-facing payloads and mutation verbs
//! - [`error`] - strict validation errors
//!
//! Everything serializes as plain JSON with camelCase field names, so a
//! table component can post a `QueryRequest` and render the returned
//! `ResultPage` without translation.

pub mod error;
pub mod filter;
pub mod options;
pub mod page;
pub mod request;
pub mod value;

pub use error::Error;
pub use filter::{Combine, FieldKind, FilterNode, PredicateKind};
pub use options::{QueryOptions, SortDirection, DEFAULT_PAGE_SIZE};
pub use page::ResultPage;
pub use request::{QueryRequest, SaveMode};
pub use value::Value;
