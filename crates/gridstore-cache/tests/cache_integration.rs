//! Integration tests for the cached repository stack.
//!
//! The Redis-backed tests need a local server on 127.0.0.1:6379 and are
//! ignored by default; run them with `cargo test -- --ignored`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gridstore_cache::{
    CacheConfig, CacheTier, CachedRepository, RedisTier, RedisTierConfig,
};
use gridstore_core::{
    Entity, FieldAccess, FieldValue, MemoryStore, Repository, StoreError, TreeEntity,
    TreeRepository,
};
use gridstore_model::{FilterNode, QueryOptions, ResultPage, SaveMode, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Product {
    id: i64,
    name: String,
    price: f64,
}

impl Product {
    fn new(id: i64, name: &str, price: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
        }
    }
}

impl FieldAccess for Product {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
            "Name" => Some(FieldValue::Scalar(Value::String(self.name.clone()))),
            "Price" => Some(FieldValue::Scalar(Value::Float(self.price))),
            _ => None,
        }
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";

    fn id(&self) -> Value {
        Value::Int(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Folder {
    id: i64,
    parent_id: Option<i64>,
    name: String,
}

impl Folder {
    fn new(id: i64, parent_id: Option<i64>, name: &str) -> Self {
        Self {
            id,
            parent_id,
            name: name.to_string(),
        }
    }
}

impl FieldAccess for Folder {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Id" => Some(FieldValue::Scalar(Value::Int(self.id))),
            "ParentId" => Some(FieldValue::Scalar(
                self.parent_id.map(Value::Int).unwrap_or(Value::Null),
            )),
            "Name" => Some(FieldValue::Scalar(Value::String(self.name.clone()))),
            _ => None,
        }
    }
}

impl Entity for Folder {
    const NAME: &'static str = "Folder";

    fn id(&self) -> Value {
        Value::Int(self.id)
    }
}

impl TreeEntity for Folder {
    fn parent_id(&self) -> Option<Value> {
        self.parent_id.map(Value::Int)
    }
}

/// Store wrapper that counts how often the cache actually falls through,
/// and can simulate a backend that rejects writes.
struct CountingStore {
    inner: MemoryStore<Product>,
    queries: AtomicU64,
    fail_writes: bool,
}

impl CountingStore {
    fn new(records: Vec<Product>) -> Self {
        Self {
            inner: MemoryStore::with_records(records),
            queries: AtomicU64::new(0),
            fail_writes: false,
        }
    }

    fn rejecting_writes(records: Vec<Product>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(records)
        }
    }

    fn query_count(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Repository<Product> for CountingStore {
    async fn query(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
    ) -> ResultPage<Product> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.inner.query(options, filter).await
    }

    async fn save(&self, records: Vec<Product>, mode: SaveMode) -> Result<u64, StoreError> {
        if self.fail_writes {
            return Err(StoreError::backend("write rejected"));
        }
        self.inner.save(records, mode).await
    }

    async fn delete(&self, ids: &[Value]) -> Result<u64, StoreError> {
        if self.fail_writes {
            return Err(StoreError::backend("write rejected"));
        }
        self.inner.delete(ids).await
    }
}

fn seed_products() -> Vec<Product> {
    vec![
        Product::new(1, "Office Desk", 349.0),
        Product::new(2, "Desk Lamp", 45.5),
        Product::new(3, "Task Chair", 199.0),
        Product::new(4, "Monitor Arm", 89.9),
        Product::new(5, "Desk Mat", 19.0),
    ]
}

async fn cached_products(config: CacheConfig) -> CachedRepository<Product, CountingStore> {
    let cache = Arc::new(config.build().await.unwrap());
    CachedRepository::new(CountingStore::new(seed_products()), cache, &config)
}

// ============== Tests ==============

#[tokio::test]
async fn test_repeat_query_served_from_cache() {
    let repo = cached_products(CacheConfig::new()).await;
    let options = QueryOptions::first_page();

    let first = repo.query(&options, None).await;
    let second = repo.query(&options, None).await;

    assert_eq!(first.total_count, 5);
    assert_eq!(first, second);
    assert_eq!(repo.inner().query_count(), 1);
}

#[tokio::test]
async fn test_distinct_pages_cached_separately() {
    let repo = cached_products(CacheConfig::new()).await;

    let page_one = repo.query(&QueryOptions::new(1, 2), None).await;
    let page_two = repo.query(&QueryOptions::new(2, 2), None).await;
    repo.query(&QueryOptions::new(1, 2), None).await;

    assert_eq!(page_one.items.len(), 2);
    assert_eq!(page_two.items.len(), 2);
    assert_ne!(page_one.items, page_two.items);
    assert_eq!(repo.inner().query_count(), 2);
}

#[tokio::test]
async fn test_filtered_and_unfiltered_do_not_share() {
    let repo = cached_products(CacheConfig::new()).await;
    let options = QueryOptions::first_page();
    let filter = FilterNode::contains("Name", "Desk");

    let all = repo.query(&options, None).await;
    let desks = repo.query(&options, Some(&filter)).await;
    repo.query(&options, None).await;
    repo.query(&options, Some(&filter)).await;

    assert_eq!(all.total_count, 5);
    assert_eq!(desks.total_count, 3);
    assert!(desks.is_filtered);
    assert_eq!(repo.inner().query_count(), 2);
}

#[tokio::test]
async fn test_save_invalidates_entity_pages() {
    let repo = cached_products(CacheConfig::new()).await;
    let options = QueryOptions::first_page();

    repo.query(&options, None).await;
    repo.save(vec![Product::new(6, "Bookshelf", 120.0)], SaveMode::Add)
        .await
        .unwrap();
    let after = repo.query(&options, None).await;

    assert_eq!(after.total_count, 6);
    assert!(after.items.iter().any(|p| p.name == "Bookshelf"));
    assert_eq!(repo.inner().query_count(), 2);
}

#[tokio::test]
async fn test_delete_invalidates_entity_pages() {
    let repo = cached_products(CacheConfig::new()).await;
    let options = QueryOptions::first_page();

    repo.query(&options, None).await;
    let removed = repo.delete(&[Value::Int(1)]).await.unwrap();
    let after = repo.query(&options, None).await;

    assert_eq!(removed, 1);
    assert_eq!(after.total_count, 4);
    assert!(after.items.iter().all(|p| p.id != 1));
    assert_eq!(repo.inner().query_count(), 2);
}

#[tokio::test]
async fn test_failed_mutation_keeps_cached_pages() {
    let config = CacheConfig::new();
    let cache = Arc::new(config.build().await.unwrap());
    let store = CountingStore::rejecting_writes(seed_products());
    let repo = CachedRepository::new(store, cache, &config);
    let options = QueryOptions::first_page();

    repo.query(&options, None).await;
    let saved = repo
        .save(vec![Product::new(6, "Bookshelf", 120.0)], SaveMode::Add)
        .await;
    let deleted = repo.delete(&[Value::Int(1)]).await;

    assert!(saved.is_err());
    assert!(deleted.is_err());

    // Nothing changed in the store, so the cached page is still valid.
    let after = repo.query(&options, None).await;
    assert_eq!(after.total_count, 5);
    assert_eq!(repo.inner().query_count(), 1);
}

#[tokio::test]
async fn test_disabled_cache_passes_through() {
    let repo = cached_products(CacheConfig::new().disabled()).await;
    let options = QueryOptions::first_page();

    repo.query(&options, None).await;
    repo.query(&options, None).await;

    assert_eq!(repo.inner().query_count(), 2);
}

#[tokio::test]
async fn test_flat_and_tree_pages_do_not_collide() {
    let config = CacheConfig::new();
    let cache = Arc::new(config.build().await.unwrap());
    let store = MemoryStore::with_records(vec![
        Folder::new(1, None, "Docs"),
        Folder::new(2, Some(1), "Guides"),
        Folder::new(3, None, "Media"),
    ]);
    let repo: CachedRepository<Folder, _> = CachedRepository::new(store, cache, &config);
    let options = QueryOptions::first_page();

    let flat = repo.query(&options, None).await;
    let tree = repo.query_tree(&options, None).await;

    // Same options, different shapes: the tree page counts roots only and
    // must not be served from the flat page's entry.
    assert_eq!(flat.total_count, 3);
    assert_eq!(tree.total_count, 2);
    assert_eq!(tree.items.len(), 3);

    let again = repo.query_tree(&options, None).await;
    assert_eq!(tree, again);
}

// ============== Redis (ignored) ==============

#[tokio::test]
#[ignore]
async fn test_redis_stack_roundtrip() {
    let config = CacheConfig::new()
        .with_namespace("gridstore-it")
        .with_redis(RedisTierConfig::new("redis://127.0.0.1:6379"));
    let cache = config.build().await.unwrap();
    assert_eq!(cache.tier_names(), vec!["memory", "redis"]);

    let stored = cache
        .set("gridstore-it:Product:roundtrip", &seed_products(), None)
        .await;
    assert!(stored);
    let back: Option<Vec<Product>> = cache.get("gridstore-it:Product:roundtrip").await;
    assert_eq!(back, Some(seed_products()));

    assert!(cache.remove_by_pattern("gridstore-it:*").await >= 1);
    assert!(!cache.exists("gridstore-it:Product:roundtrip").await);
}

#[tokio::test]
#[ignore]
async fn test_redis_frames_large_values() {
    let config = RedisTierConfig::new("redis://127.0.0.1:6379").with_compression_threshold(64);
    let tier = RedisTier::connect(config).await.unwrap();

    let payload = vec![b'x'; 16 * 1024];
    tier.set_bytes("gridstore-it:blob", payload.clone(), None)
        .await
        .unwrap();
    let back = tier.get_bytes("gridstore-it:blob").await.unwrap();
    assert_eq!(back, Some(payload));

    tier.remove("gridstore-it:blob").await.unwrap();
}
