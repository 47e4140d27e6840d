//! Gridstore Core - Store-agnostic query engine and repository traits.
//!
//! This crate turns a dumb record source into the paginated, filterable,
//! sortable query surface a CRUD table UI needs. Filters arrive as a
//! serializable tree ([`gridstore_model::FilterNode`]), are compiled once
//! per query, and run against records through the [`FieldAccess`] trait,
//! so the engine never depends on a concrete storage backend or record
//! layout.

pub mod engine;
pub mod entity;
pub mod error;
pub mod memory;
pub mod predicate;
pub mod repository;
pub mod source;
pub mod tree;

pub use engine::QueryEngine;
pub use entity::{Entity, FieldAccess, FieldValue, TreeEntity};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use predicate::Predicate;
pub use repository::{Repository, TreeRepository};
pub use source::{RecordSource, TreeSource};
pub use tree::MAX_TREE_DEPTH;

/// Re-export model types.
pub use gridstore_model as model;
