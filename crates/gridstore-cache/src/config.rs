//! Cache configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CacheError;
use crate::memory::MemoryTier;
use crate::multi::MultiLevelCache;
use crate::redis::RedisTier;
use crate::tier::CacheTier;

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "gridstore";

/// Default time-to-live for cached result pages.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default maximum entry count for the in-process tier.
pub const DEFAULT_MEMORY_MAX_ITEMS: usize = 10_000;

/// Default payload byte budget for the in-process tier.
pub const DEFAULT_MEMORY_MAX_BYTES: usize = 64 * 1024 * 1024;

/// Default time-to-live for in-process entries.
pub const DEFAULT_MEMORY_TTL_SECS: u64 = 60;

/// Hard ceiling on in-process entry time-to-live.
pub const DEFAULT_MEMORY_MAX_TTL_SECS: u64 = 300;

/// Default interval between sweeper runs.
pub const DEFAULT_SCAN_FREQUENCY_SECS: u64 = 60;

/// Default size above which Redis values are gzip-compressed.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

/// In-process tier settings.
#[derive(Debug, Clone)]
pub struct MemoryTierConfig {
    /// Maximum number of entries; the tier declines new keys beyond it.
    pub max_items: usize,

    /// Maximum total payload bytes; the tier declines writes that would
    /// push it past this budget.
    pub max_bytes: usize,

    /// Time-to-live applied when a write does not specify one.
    pub default_ttl: Duration,

    /// Ceiling applied to every entry, including explicit TTLs. Keeps the
    /// in-process copy shorter-lived than the distributed one.
    pub max_ttl: Duration,

    /// How often the background sweeper drops expired entries.
    pub scan_frequency: Duration,
}

impl MemoryTierConfig {
    pub fn new() -> Self {
        Self {
            max_items: DEFAULT_MEMORY_MAX_ITEMS,
            max_bytes: DEFAULT_MEMORY_MAX_BYTES,
            default_ttl: Duration::from_secs(DEFAULT_MEMORY_TTL_SECS),
            max_ttl: Duration::from_secs(DEFAULT_MEMORY_MAX_TTL_SECS),
            scan_frequency: Duration::from_secs(DEFAULT_SCAN_FREQUENCY_SECS),
        }
    }

    /// Set the maximum entry count.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Set the payload byte budget.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes.max(1);
        self
    }

    /// Set the default entry time-to-live.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the time-to-live ceiling.
    pub fn with_max_ttl(mut self, ttl: Duration) -> Self {
        self.max_ttl = ttl;
        self
    }

    /// Set the sweeper interval.
    pub fn with_scan_frequency(mut self, frequency: Duration) -> Self {
        self.scan_frequency = frequency;
        self
    }
}

impl Default for MemoryTierConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Redis tier settings.
#[derive(Debug, Clone)]
pub struct RedisTierConfig {
    /// Server URL, e.g. `redis://127.0.0.1:6379/0`.
    pub url: String,

    /// Logical database index. When non-zero it overrides any index in
    /// the URL path.
    pub database: u32,

    /// Time-to-live applied when a write does not specify one.
    pub default_ttl: Duration,

    /// Values at or above this many serialized bytes are gzip-compressed.
    pub compression_threshold: usize,
}

impl RedisTierConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: 0,
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }

    /// Set the logical database index.
    pub fn with_database(mut self, database: u32) -> Self {
        self.database = database;
        self
    }

    /// Set the default entry time-to-live.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the compression threshold in bytes.
    pub fn with_compression_threshold(mut self, threshold: usize) -> Self {
        self.compression_threshold = threshold;
        self
    }
}

/// Top-level cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Master switch; a disabled cache makes the decorator pass through.
    pub enabled: bool,

    /// Namespace prefixing every key, isolating applications that share
    /// a Redis database.
    pub namespace: String,

    /// Time-to-live for cached pages of entities without an override.
    pub default_ttl: Duration,

    /// Per-entity time-to-live overrides, keyed by entity name.
    pub entity_ttl: HashMap<String, Duration>,

    /// In-process tier settings.
    pub memory: MemoryTierConfig,

    /// Redis tier settings; `None` runs in-process only.
    pub redis: Option<RedisTierConfig>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self {
            enabled: true,
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            entity_ttl: HashMap::new(),
            memory: MemoryTierConfig::default(),
            redis: None,
        }
    }

    /// Disable caching; the decorator will delegate every call.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the default page time-to-live.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Override the time-to-live for one entity type.
    pub fn with_entity_ttl(mut self, entity: impl Into<String>, ttl: Duration) -> Self {
        self.entity_ttl.insert(entity.into(), ttl);
        self
    }

    /// Replace the in-process tier settings.
    pub fn with_memory(mut self, memory: MemoryTierConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Add a Redis tier.
    pub fn with_redis(mut self, redis: RedisTierConfig) -> Self {
        self.redis = Some(redis);
        self
    }

    /// Check whether a Redis tier is configured.
    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Time-to-live for one entity's pages.
    pub fn ttl_for(&self, entity: &str) -> Duration {
        self.entity_ttl
            .get(entity)
            .copied()
            .unwrap_or(self.default_ttl)
    }

    /// Assemble the tier stack: in-process first, then Redis when
    /// configured. Spawns the memory sweeper, so this must run inside a
    /// tokio runtime. Fails if the initial Redis connection cannot be
    /// established.
    pub async fn build(&self) -> Result<MultiLevelCache, CacheError> {
        let memory = Arc::new(MemoryTier::new(self.memory.clone()));
        memory.spawn_sweeper();

        let mut tiers: Vec<Arc<dyn CacheTier>> = vec![memory];
        if let Some(redis) = &self.redis {
            tiers.push(Arc::new(RedisTier::connect(redis.clone()).await?));
        }
        Ok(MultiLevelCache::new(tiers))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}
