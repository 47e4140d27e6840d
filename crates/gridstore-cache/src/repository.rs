//! Caching decorator over a repository.
//!
//! Wraps any [`Repository`] and serves repeated queries from the cache.
//! Reads are read-through: a miss falls to the inner repository and the
//! page is written back with the entity's TTL. Writes are
//! invalidate-after: once the inner mutation succeeds, every cached page
//! of that entity type is dropped by key prefix, so the next read of any
//! page re-queries the store. The decorator never fails a call because
//! of the cache; cache trouble degrades to pass-through.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gridstore_core::{Entity, Repository, StoreError, TreeEntity, TreeRepository};
use gridstore_model::{FilterNode, QueryOptions, ResultPage, SaveMode, Value};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::key::KeyGenerator;
use crate::multi::MultiLevelCache;

/// A repository that caches query pages per entity type.
pub struct CachedRepository<R, S> {
    inner: S,
    cache: Arc<MultiLevelCache>,
    keys: KeyGenerator,
    enabled: bool,
    ttl: Duration,
    _marker: PhantomData<fn() -> R>,
}

impl<R, S> CachedRepository<R, S>
where
    R: Entity,
    S: Repository<R>,
{
    /// Wrap a repository. The TTL comes from the config's per-entity
    /// overrides, falling back to its default.
    pub fn new(inner: S, cache: Arc<MultiLevelCache>, config: &CacheConfig) -> Self {
        Self {
            inner,
            cache,
            keys: KeyGenerator::new(config.namespace.clone()),
            enabled: config.enabled,
            ttl: config.ttl_for(R::NAME),
            _marker: PhantomData,
        }
    }

    /// Access the wrapped repository.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Serve a page from cache, or fetch it from the inner repository and
    /// write it back. `tree` keeps flat and tree pages of the same request
    /// from sharing an entry.
    async fn query_through<F>(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
        tree: bool,
        fetch: F,
    ) -> ResultPage<R>
    where
        F: std::future::Future<Output = ResultPage<R>>,
    {
        if !self.enabled {
            return fetch.await;
        }
        let key = match self.keys.entity_key::<R>(options, filter, tree) {
            Ok(key) => key,
            Err(err) => {
                warn!(entity = R::NAME, error = %err, "key generation failed; bypassing cache");
                return fetch.await;
            }
        };
        if let Some(page) = self.cache.get::<ResultPage<R>>(&key).await {
            debug!(key = %key, "page served from cache");
            return page;
        }
        let page = fetch.await;
        self.cache.set(&key, &page, Some(self.ttl)).await;
        page
    }

    /// Drop every cached page of this entity type.
    async fn invalidate(&self) {
        if !self.enabled {
            return;
        }
        let pattern = self.keys.pattern::<R>();
        let removed = self.cache.remove_by_pattern(&pattern).await;
        debug!(entity = R::NAME, removed, "invalidated cached pages after write");
    }
}

#[async_trait]
impl<R, S> Repository<R> for CachedRepository<R, S>
where
    R: Entity,
    S: Repository<R>,
{
    async fn query(&self, options: &QueryOptions, filter: Option<&FilterNode>) -> ResultPage<R> {
        self.query_through(options, filter, false, self.inner.query(options, filter))
            .await
    }

    async fn save(&self, records: Vec<R>, mode: SaveMode) -> Result<u64, StoreError> {
        let affected = self.inner.save(records, mode).await.map_err(|err| {
            warn!(entity = R::NAME, error = %err, "save failed; cached pages kept");
            err
        })?;
        self.invalidate().await;
        Ok(affected)
    }

    async fn delete(&self, ids: &[Value]) -> Result<u64, StoreError> {
        let affected = self.inner.delete(ids).await.map_err(|err| {
            warn!(entity = R::NAME, error = %err, "delete failed; cached pages kept");
            err
        })?;
        self.invalidate().await;
        Ok(affected)
    }
}

#[async_trait]
impl<R, S> TreeRepository<R> for CachedRepository<R, S>
where
    R: TreeEntity,
    S: TreeRepository<R>,
{
    async fn query_tree(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
    ) -> ResultPage<R> {
        self.query_through(options, filter, true, self.inner.query_tree(options, filter))
            .await
    }
}
