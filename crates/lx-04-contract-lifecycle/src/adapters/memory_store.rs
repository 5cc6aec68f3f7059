//! In-memory record store.

use crate::domain::{RecordFilter, RecordPatch};
use crate::errors::StoreError;
use crate::ports::RecordStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ContractId, ContractRecord};
use std::collections::HashMap;

/// `RecordStore` over a map. Each operation holds the lock for its whole
/// read-check-write, which gives per-record atomicity.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<ContractId, ContractRecord>>,
}

impl InMemoryRecordStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Stores `record` as-is, replacing any record with the same id.
    /// Bypasses status guards; used to seed fixtures.
    pub fn put(&self, record: ContractRecord) {
        self.records.write().insert(record.id, record);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, id: &ContractId) -> Result<Option<ContractRecord>, StoreError> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn insert(&self, record: ContractRecord) -> Result<(), StoreError> {
        record
            .check_invariants()
            .map_err(|source| StoreError::Invariant { id: record.id, source })?;

        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn update(
        &self,
        expected: &ContractRecord,
        patch: RecordPatch,
    ) -> Result<ContractRecord, StoreError> {
        let id = expected.id;
        let mut records = self.records.write();
        let stored = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if stored != expected {
            return Err(StoreError::Conflict { id, status: stored.status });
        }

        let mut updated = stored.clone();
        patch.apply(&mut updated);
        updated
            .check_invariants()
            .map_err(|source| StoreError::Invariant { id, source })?;

        *stored = updated.clone();
        Ok(updated)
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<ContractRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn delete(&self, expected: &ContractRecord) -> Result<(), StoreError> {
        let id = expected.id;
        let mut records = self.records.write();
        let stored = records.get(&id).ok_or(StoreError::NotFound(id))?;
        if stored != expected {
            return Err(StoreError::Conflict { id, status: stored.status });
        }
        records.remove(&id);
        Ok(())
    }
}
