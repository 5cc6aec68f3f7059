//! # Outbound Ports (Driven Ports)

use crate::domain::{RecordFilter, RecordPatch};
use crate::errors::StoreError;
use async_trait::async_trait;
use shared_types::{ContractId, ContractRecord};

/// Document store holding contract records.
///
/// Atomic per record, no cross-record transactions. Writes are guarded by
/// the whole record the writer read (compare-and-set): any change in
/// between, status or content, fails the write with `Conflict`.
///
/// Production: external document store
/// Testing: `InMemoryRecordStore`
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads one record.
    async fn get(&self, id: &ContractId) -> Result<Option<ContractRecord>, StoreError>;

    /// Stores a new record.
    async fn insert(&self, record: ContractRecord) -> Result<(), StoreError>;

    /// Applies `patch` if the stored record still equals `expected`.
    /// Returns the updated record.
    async fn update(
        &self,
        expected: &ContractRecord,
        patch: RecordPatch,
    ) -> Result<ContractRecord, StoreError>;

    /// All records passing `filter`.
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<ContractRecord>, StoreError>;

    /// Deletes the record if the stored record still equals `expected`.
    async fn delete(&self, expected: &ContractRecord) -> Result<(), StoreError>;
}

/// The authentication boundary.
pub trait IdentityProvider: Send + Sync {
    /// Id of the user behind the current request, if any.
    fn current_user_id(&self) -> Option<String>;
}
