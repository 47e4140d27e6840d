//! Gridstore Benchmark Suite
//!
//! Criterion benchmarks for the query pipeline and cache layers.
//!
//! # Benchmark Categories
//!
//! - **Query**: scans, filter evaluation, sorting, pagination
//! - **Tree**: hierarchy materialization over different forest shapes
//! - **Cache**: key fingerprinting, tier operations, read-through hits
//!   and misses

pub mod fixtures;

pub use fixtures::{customer_store, generate_customers, generate_org_units, org_store, Scale};
