//! Multi-level cache orchestration.
//!
//! Tiers are ordered fastest first. Reads probe in order and return the
//! first live entry, promoting it into every faster tier in the
//! background so the next read is local. Writes go to all tiers at once.
//! A failing tier is logged and skipped; the stack degrades to whatever
//! still answers, and a fully dark cache behaves like a miss on every
//! read, which the query layer already tolerates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::tier::{CacheTier, TierStats};

/// An ordered stack of cache tiers behind one typed surface.
///
/// Values are serialized once on write and deserialized on every hit;
/// tiers only ever see bytes.
pub struct MultiLevelCache {
    tiers: Vec<Arc<dyn CacheTier>>,
}

impl MultiLevelCache {
    /// Build from tiers ordered fastest first.
    pub fn new(tiers: Vec<Arc<dyn CacheTier>>) -> Self {
        Self { tiers }
    }

    /// Tier names in probe order.
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    /// Read a value, probing tiers fastest-first.
    ///
    /// A hit in a slower tier is promoted into all faster tiers in the
    /// background; the caller never waits on promotion. Read failures and
    /// undecodable entries count as misses for that tier.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        for (index, tier) in self.tiers.iter().enumerate() {
            let bytes = match tier.get_bytes(key).await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(err) => {
                    warn!(key, tier = tier.name(), error = %err, "tier read failed; trying next");
                    continue;
                }
            };
            match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    self.promote(index, key, bytes);
                    return Some(value);
                }
                Err(err) => {
                    warn!(
                        key,
                        tier = tier.name(),
                        error = %err,
                        "cached entry failed to deserialize; dropping it"
                    );
                    let _ = tier.remove(key).await;
                }
            }
        }
        None
    }

    /// Spawn write-behind promotion into every tier faster than the hit.
    ///
    /// Promoted entries take each faster tier's default TTL rather than
    /// inheriting the remaining lifetime, which the tiers do not expose.
    fn promote(&self, hit_index: usize, key: &str, bytes: Vec<u8>) {
        if hit_index == 0 {
            return;
        }
        let faster: Vec<Arc<dyn CacheTier>> = self.tiers[..hit_index].to_vec();
        let key = key.to_string();
        tokio::spawn(async move {
            for tier in faster {
                if let Err(err) = tier.set_bytes(&key, bytes.clone(), None).await {
                    debug!(key = %key, tier = tier.name(), error = %err, "promotion failed");
                }
            }
        });
    }

    /// Serialize a value once and write it through every tier.
    ///
    /// Returns true if at least one tier stored the entry.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "value failed to serialize; not cached");
                return false;
            }
        };
        let writes = self.tiers.iter().map(|tier| {
            let bytes = bytes.clone();
            async move { tier.set_bytes(key, bytes, ttl).await }
        });
        let mut stored = false;
        for (tier, result) in self.tiers.iter().zip(join_all(writes).await) {
            match result {
                Ok(true) => stored = true,
                Ok(false) => debug!(key, tier = tier.name(), "tier declined entry"),
                Err(err) => warn!(key, tier = tier.name(), error = %err, "tier write failed"),
            }
        }
        stored
    }

    /// Remove one key from every tier. Returns true if any tier held it.
    pub async fn remove(&self, key: &str) -> bool {
        let mut removed = false;
        for tier in &self.tiers {
            match tier.remove(key).await {
                Ok(hit) => removed |= hit,
                Err(err) => warn!(key, tier = tier.name(), error = %err, "tier remove failed"),
            }
        }
        removed
    }

    /// Remove every key matching a glob pattern from every tier.
    ///
    /// Returns the summed per-tier removal counts; one entry present in
    /// two tiers counts twice.
    pub async fn remove_by_pattern(&self, pattern: &str) -> u64 {
        let mut removed = 0;
        for tier in &self.tiers {
            match tier.remove_by_pattern(pattern).await {
                Ok(count) => removed += count,
                Err(err) => {
                    warn!(pattern, tier = tier.name(), error = %err, "tier pattern removal failed");
                }
            }
        }
        removed
    }

    /// Check whether any tier holds a live entry.
    pub async fn exists(&self, key: &str) -> bool {
        for tier in &self.tiers {
            match tier.exists(key).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(err) => warn!(key, tier = tier.name(), error = %err, "tier exists failed"),
            }
        }
        false
    }

    /// Per-tier statistics, keyed by tier name.
    pub async fn statistics(&self) -> HashMap<String, TierStats> {
        let mut stats = HashMap::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            stats.insert(tier.name().to_string(), tier.stats().await);
        }
        stats
    }
}
