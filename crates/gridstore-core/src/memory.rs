//! In-memory record store.
//!
//! Backs the whole repository surface with a `Vec` behind an `RwLock`.
//! Useful as a test double and for small reference datasets; also the
//! reference implementation other store adapters are checked against.

use async_trait::async_trait;
use gridstore_model::{FilterNode, QueryOptions, ResultPage, SaveMode, Value};
use parking_lot::RwLock;

use crate::engine::QueryEngine;
use crate::entity::{Entity, TreeEntity};
use crate::error::StoreError;
use crate::repository::{Repository, TreeRepository};
use crate::source::{RecordSource, TreeSource};

/// Thread-safe in-memory store for one entity type.
pub struct MemoryStore<R> {
    records: RwLock<Vec<R>>,
}

impl<R: Entity> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<R: Entity> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Entity> RecordSource<R> for MemoryStore<R> {
    async fn scan(&self) -> Result<Vec<R>, StoreError> {
        Ok(self.records.read().clone())
    }
}

#[async_trait]
impl<R: TreeEntity> TreeSource<R> for MemoryStore<R> {
    async fn children_of(&self, parent: &Value) -> Result<Vec<R>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.parent_id().is_some_and(|p| p.loose_eq(parent)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<R: Entity> Repository<R> for MemoryStore<R> {
    async fn query(&self, options: &QueryOptions, filter: Option<&FilterNode>) -> ResultPage<R> {
        QueryEngine::new(self).flat(options, filter).await
    }

    async fn save(&self, records: Vec<R>, mode: SaveMode) -> Result<u64, StoreError> {
        let mut guard = self.records.write();
        match mode {
            SaveMode::Add => {
                for record in &records {
                    let id = record.id();
                    if guard.iter().any(|existing| existing.id().loose_eq(&id)) {
                        return Err(StoreError::DuplicateId(format!("{}:{:?}", R::NAME, id)));
                    }
                }
                let written = records.len() as u64;
                guard.extend(records);
                Ok(written)
            }
            SaveMode::Update => {
                let mut written = 0;
                for record in records {
                    let id = record.id();
                    match guard.iter_mut().find(|existing| existing.id().loose_eq(&id)) {
                        Some(slot) => {
                            *slot = record;
                            written += 1;
                        }
                        None => {
                            return Err(StoreError::NotFound(format!("{}:{:?}", R::NAME, id)))
                        }
                    }
                }
                Ok(written)
            }
        }
    }

    async fn delete(&self, ids: &[Value]) -> Result<u64, StoreError> {
        let mut guard = self.records.write();
        let before = guard.len();
        guard.retain(|record| {
            let id = record.id();
            !ids.iter().any(|candidate| candidate.loose_eq(&id))
        });
        Ok((before - guard.len()) as u64)
    }
}

#[async_trait]
impl<R: TreeEntity> TreeRepository<R> for MemoryStore<R> {
    async fn query_tree(
        &self,
        options: &QueryOptions,
        filter: Option<&FilterNode>,
    ) -> ResultPage<R> {
        QueryEngine::new(self).tree(options, filter).await
    }
}
