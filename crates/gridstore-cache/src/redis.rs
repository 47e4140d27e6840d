//! Redis cache tier.
//!
//! Entries are framed with a one-byte header (raw or gzip) and written
//! with a server-side TTL, so the tier needs no sweeper of its own.
//! Pattern invalidation is cursor-based SCAN + DEL — never KEYS, which
//! blocks the server on large databases. A Lua script runs the whole scan
//! server-side in one round trip; if the server refuses scripting, the
//! tier falls back to driving the cursor from the client.

use std::io::{Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};
use tracing::debug;

use crate::config::RedisTierConfig;
use crate::error::CacheError;
use crate::tier::{CacheTier, TierCounters, TierStats};

/// Frame header: payload bytes follow unmodified.
const FRAME_RAW: u8 = 0;
/// Frame header: payload bytes are gzip-compressed.
const FRAME_GZIP: u8 = 1;

/// Keys examined per SCAN iteration.
const SCAN_COUNT: u32 = 500;

/// Server-side scan-and-delete. ARGV[1] is the glob pattern, ARGV[2] the
/// per-iteration count. Returns the number of keys deleted.
const SCAN_DELETE_SCRIPT: &str = r#"
local cursor = "0"
local deleted = 0
repeat
    local reply = redis.call("SCAN", cursor, "MATCH", ARGV[1], "COUNT", ARGV[2])
    cursor = reply[1]
    for _, key in ipairs(reply[2]) do
        redis.call("DEL", key)
        deleted = deleted + 1
    end
until cursor == "0"
return deleted
"#;

/// Distributed cache tier backed by a Redis server.
pub struct RedisTier {
    conn: ConnectionManager,
    config: RedisTierConfig,
    counters: TierCounters,
}

impl RedisTier {
    /// Connect to the configured server.
    ///
    /// The connection manager reconnects on its own after transient
    /// failures; only the initial connection errors here.
    pub async fn connect(config: RedisTierConfig) -> Result<Self, CacheError> {
        let mut info = config.url.as_str().into_connection_info()?;
        if config.database > 0 {
            info.redis.db = i64::from(config.database);
        }
        let client = redis::Client::open(info)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            config,
            counters: TierCounters::default(),
        })
    }

    async fn scan_delete(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            if !keys.is_empty() {
                let removed: u64 = conn.del(keys).await?;
                deleted += removed;
            }
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl CacheTier for RedisTier {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let framed: Option<Vec<u8>> = conn.get(key).await?;
        match framed {
            Some(framed) => {
                self.counters.record_hit();
                decode_frame(&framed).map(Some)
            }
            None => {
                self.counters.record_miss();
                Ok(None)
            }
        }
    }

    async fn set_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let framed = encode_frame(&bytes, self.config.compression_threshold)?;
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(framed)
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;
        Ok(true)
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn remove_by_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let script = redis::Script::new(SCAN_DELETE_SCRIPT);
        let scripted: Result<u64, redis::RedisError> = script
            .arg(pattern)
            .arg(SCAN_COUNT)
            .invoke_async(&mut conn)
            .await;
        match scripted {
            Ok(deleted) => Ok(deleted),
            Err(err) => {
                debug!(error = %err, "scan script rejected; falling back to client-side scan");
                self.scan_delete(pattern).await
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn stats(&self) -> TierStats {
        // DBSIZE counts the whole logical database, so the number is an
        // upper bound when other applications share it.
        let mut conn = self.conn.clone();
        let items: u64 = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .unwrap_or(0);
        self.counters.snapshot(items)
    }
}

fn encode_frame(bytes: &[u8], threshold: usize) -> Result<Vec<u8>, CacheError> {
    if bytes.len() >= threshold {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity(bytes.len() / 2 + 1),
            Compression::default(),
        );
        encoder.write_all(bytes)?;
        let compressed = encoder.finish()?;
        let mut framed = Vec::with_capacity(compressed.len() + 1);
        framed.push(FRAME_GZIP);
        framed.extend_from_slice(&compressed);
        Ok(framed)
    } else {
        let mut framed = Vec::with_capacity(bytes.len() + 1);
        framed.push(FRAME_RAW);
        framed.extend_from_slice(bytes);
        Ok(framed)
    }
}

fn decode_frame(framed: &[u8]) -> Result<Vec<u8>, CacheError> {
    match framed.split_first() {
        Some((&FRAME_RAW, payload)) => Ok(payload.to_vec()),
        Some((&FRAME_GZIP, payload)) => {
            let mut decoder = GzDecoder::new(payload);
            let mut bytes = Vec::new();
            decoder.read_to_end(&mut bytes)?;
            Ok(bytes)
        }
        Some((header, _)) => Err(CacheError::CorruptEntry(format!(
            "unknown frame header {header:#04x}"
        ))),
        None => Err(CacheError::CorruptEntry("empty frame".to_string())),
    }
}
