//! Gridstore Cache - Multi-level caching for query pages.
//!
//! Query pages are expensive to materialize and cheap to reuse: the same
//! table view asks for the same page over and over between edits. This
//! crate stacks an in-process tier over an optional Redis tier behind one
//! typed surface ([`MultiLevelCache`]), keys entries by a deterministic
//! fingerprint of the query ([`KeyGenerator`]), and wraps any repository
//! in a read-through, invalidate-after-write decorator
//! ([`CachedRepository`]). The cache is an accelerator, never a
//! dependency: every failure path degrades to querying the store.

pub mod config;
pub mod error;
pub mod key;
pub mod memory;
pub mod multi;
pub mod redis;
pub mod repository;
pub mod tier;

pub use config::{CacheConfig, MemoryTierConfig, RedisTierConfig};
pub use error::CacheError;
pub use key::KeyGenerator;
pub use memory::MemoryTier;
pub use multi::MultiLevelCache;
pub use repository::CachedRepository;
pub use self::redis::RedisTier;
pub use tier::{CacheTier, TierStats};
