//! In-process cache tier.
//!
//! Entries live in a concurrent map with per-entry expiry. Expired entries
//! are dropped lazily on read and in bulk by a background sweeper, so the
//! map never serves stale bytes but also never blocks writers on cleanup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::MemoryTierConfig;
use crate::error::CacheError;
use crate::tier::{CacheTier, TierCounters, TierStats};

struct Entry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Process-local cache tier backed by a `DashMap`.
pub struct MemoryTier {
    entries: DashMap<String, Entry>,
    bytes_used: AtomicUsize,
    config: MemoryTierConfig,
    counters: TierCounters,
}

impl MemoryTier {
    pub fn new(config: MemoryTierConfig) -> Self {
        Self {
            entries: DashMap::new(),
            bytes_used: AtomicUsize::new(0),
            config,
            counters: TierCounters::default(),
        }
    }

    /// Start the background sweeper for this tier.
    ///
    /// The task holds only a weak reference and exits when the tier is
    /// dropped, so the handle can be detached. Must be called from within
    /// a tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let period = self.config.scan_frequency;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(tier) = weak.upgrade() else { break };
                let purged = tier.purge_expired();
                if purged > 0 {
                    debug!(purged, "memory tier swept expired entries");
                }
            }
        })
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0;
        let mut freed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                purged += 1;
                freed += entry.bytes.len();
                false
            } else {
                true
            }
        });
        self.bytes_used.fetch_sub(freed, Ordering::Relaxed);
        purged
    }

    /// Raw entry count, expired entries included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total payload bytes held, expired entries included until swept.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used.load(Ordering::Relaxed)
    }

    fn effective_ttl(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.config.default_ttl)
            .min(self.config.max_ttl)
    }

    /// Check whether writing `incoming` bytes under `key` would push the
    /// tier past its entry or byte budget.
    fn over_budget(&self, key: &str, incoming: usize) -> bool {
        let (occupied, displaced) = match self.entries.get(key) {
            Some(entry) => (true, entry.bytes.len()),
            None => (false, 0),
        };
        let projected_items = self.entries.len() + usize::from(!occupied);
        let projected_bytes =
            (self.bytes_used.load(Ordering::Relaxed) + incoming).saturating_sub(displaced);
        projected_items > self.config.max_items || projected_bytes > self.config.max_bytes
    }
}

#[async_trait]
impl CacheTier for MemoryTier {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                self.counters.record_hit();
                return Ok(Some(entry.bytes.clone()));
            }
        }
        // Absent, or present but expired; drop the corpse eagerly.
        if let Some((_, entry)) = self.entries.remove_if(key, |_, entry| entry.is_expired(now)) {
            self.bytes_used.fetch_sub(entry.bytes.len(), Ordering::Relaxed);
        }
        self.counters.record_miss();
        Ok(None)
    }

    async fn set_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let incoming = bytes.len();
        if self.over_budget(key, incoming) {
            self.purge_expired();
            if self.over_budget(key, incoming) {
                debug!(
                    key,
                    max_items = self.config.max_items,
                    max_bytes = self.config.max_bytes,
                    "memory tier full; declining entry"
                );
                return Ok(false);
            }
        }
        let expires_at = Instant::now() + self.effective_ttl(ttl);
        if let Some(previous) = self.entries.insert(key.to_string(), Entry { bytes, expires_at }) {
            self.bytes_used.fetch_sub(previous.bytes.len(), Ordering::Relaxed);
        }
        self.bytes_used.fetch_add(incoming, Ordering::Relaxed);
        Ok(true)
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        match self.entries.remove(key) {
            Some((_, entry)) => {
                self.bytes_used.fetch_sub(entry.bytes.len(), Ordering::Relaxed);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut removed = 0;
        let mut freed = 0;
        self.entries.retain(|key, entry| {
            if crate::tier::glob_match(pattern, key) {
                removed += 1;
                freed += entry.bytes.len();
                false
            } else {
                true
            }
        });
        self.bytes_used.fetch_sub(freed, Ordering::Relaxed);
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .map_or(false, |entry| !entry.is_expired(now)))
    }

    async fn stats(&self) -> TierStats {
        let now = Instant::now();
        let live = self
            .entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count() as u64;
        self.counters.snapshot(live)
    }
}
