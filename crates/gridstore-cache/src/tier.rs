//! Cache tier abstraction.
//!
//! A tier stores opaque bytes; serialization lives one level up in the
//! multi-level cache, so every tier behaves the same whether it keeps
//! entries in a process-local map or on a Redis server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Point-in-time statistics for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    /// Reads that found a live entry.
    pub hit_count: u64,
    /// Reads that found nothing (or an expired entry).
    pub miss_count: u64,
    /// Entries currently held. Approximate for distributed tiers.
    pub item_count: u64,
    /// Microseconds since the Unix epoch when this snapshot was taken.
    pub last_updated: u64,
}

/// One level of the cache stack.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Short tier name used in statistics maps and logs.
    fn name(&self) -> &str;

    /// Read the bytes stored under a key, if present and not expired.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store bytes under a key. A `ttl` of `None` applies the tier
    /// default. Returns whether the entry was stored; a tier may decline
    /// (e.g. at capacity) without that being an error.
    async fn set_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError>;

    /// Remove one key. Returns whether an entry existed.
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every key matching a glob pattern (`*` any run, `?` one
    /// character). Returns the number of entries removed.
    async fn remove_by_pattern(&self, pattern: &str) -> Result<u64, CacheError>;

    /// Check for a live entry without reading it.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Current statistics for this tier.
    async fn stats(&self) -> TierStats;
}

/// Hit/miss counters shared by tier implementations.
#[derive(Debug, Default)]
pub(crate) struct TierCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TierCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, item_count: u64) -> TierStats {
        TierStats {
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            item_count,
            last_updated: now_micros(),
        }
    }
}

pub(crate) fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros() as u64)
        .unwrap_or(0)
}

/// Match a key against a glob pattern: `*` matches any run of characters,
/// `?` matches exactly one.
///
/// Backtracking recursion over cloned iterators; patterns here are short
/// (`namespace:Entity:*`), so the worst case never bites.
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    glob_match_recursive(&mut pattern.chars().peekable(), &mut key.chars().peekable())
}

fn glob_match_recursive(
    pattern: &mut std::iter::Peekable<std::str::Chars>,
    key: &mut std::iter::Peekable<std::str::Chars>,
) -> bool {
    loop {
        match (pattern.peek().copied(), key.peek().copied()) {
            (None, None) => return true,
            (None, Some(_)) => return false,
            (Some('*'), _) => {
                pattern.next();

                // A trailing star matches the rest of the key.
                if pattern.peek().is_none() {
                    return true;
                }

                // Try swallowing 0, 1, 2, ... characters.
                loop {
                    let mut pattern_clone = pattern.clone();
                    let mut key_clone = key.clone();
                    if glob_match_recursive(&mut pattern_clone, &mut key_clone) {
                        return true;
                    }
                    if key.next().is_none() {
                        return false;
                    }
                }
            }
            (Some('?'), Some(_)) => {
                pattern.next();
                key.next();
            }
            (Some('?'), None) => return false,
            (Some(p), Some(c)) => {
                if p == c {
                    pattern.next();
                    key.next();
                } else {
                    return false;
                }
            }
            (Some(_), None) => return false,
        }
    }
}
