//! # Error Types
//!
//! `StoreError` is what a record store reports; `LifecycleError` is what the
//! orchestrator reports. Every variant maps onto one `ErrorKind`.

use lx_02_solc_adapter::CompileError;
use lx_03_ledger_client::LedgerError;
use shared_types::{ContractId, ContractStatus, ErrorKind, RecordInvariantError};
use thiserror::Error;

/// Errors raised by a record store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record changed since the writer read it.
    #[error("contract {id} changed since it was read (now {status})")]
    Conflict {
        /// Record written.
        id: ContractId,
        /// Status currently stored.
        status: ContractStatus,
    },

    /// No record with this id.
    #[error("contract {0} not found")]
    NotFound(ContractId),

    /// A record with this id already exists.
    #[error("contract {0} already exists")]
    Duplicate(ContractId),

    /// The write would break a record invariant.
    #[error("contract {id}: {source}")]
    Invariant {
        /// Record written.
        id: ContractId,
        /// Broken invariant.
        source: RecordInvariantError,
    },

    /// The backing store failed.
    #[error("record store unavailable: {0}")]
    Backend(String),
}

/// Errors raised by the lifecycle orchestrator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LifecycleError {
    /// No record with this id or deployed address.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// Caller is anonymous, not the owner, or not allowed this operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Refused because the record is at or past DEPLOYED.
    #[error("contract is already {0}")]
    AlreadyConfirmed(ContractStatus),

    /// The state machine forbids this transition.
    #[error("cannot move contract from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: ContractStatus,
        /// Requested status.
        to: ContractStatus,
    },

    /// The record changed between read and write.
    #[error("status conflict: {0}")]
    StatusConflict(String),

    /// Required artifact (source, bytecode) missing.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    /// The compiler adapter failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The ledger client failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The record store failed.
    #[error("record store error: {0}")]
    Store(String),
}

impl LifecycleError {
    /// Outcome category for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RecordNotFound(_) => ErrorKind::RecordNotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::AlreadyConfirmed(_) => ErrorKind::AlreadyConfirmed,
            Self::InvalidStatusTransition { .. } => ErrorKind::InvalidStatusTransition,
            Self::StatusConflict(_) => ErrorKind::StatusConflict,
            Self::InvalidArtifact(_) => ErrorKind::InvalidArtifact,
            Self::Compile(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Store(_) => ErrorKind::ConnectionError,
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::StatusConflict(err.to_string()),
            StoreError::NotFound(id) => Self::RecordNotFound(id.to_string()),
            StoreError::Invariant { .. } => Self::InvalidArtifact(err.to_string()),
            StoreError::Duplicate(_) | StoreError::Backend(_) => Self::Store(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_kinds_pass_through() {
        let err = LifecycleError::from(CompileError::CompilationFailed("x".into()));
        assert_eq!(err.kind(), ErrorKind::CompilationFailed);

        let err = LifecycleError::from(LedgerError::receipt_not_found());
        assert_eq!(err.kind(), ErrorKind::DeploymentFailed);
        assert_eq!(err.to_string(), "deployment failed: receipt not found");

        let err = LifecycleError::from(LedgerError::Reverted("execution reverted".into()));
        assert_eq!(err.kind(), ErrorKind::ContractReverted);
    }

    #[test]
    fn test_store_conflict_is_status_conflict() {
        let err = LifecycleError::from(StoreError::Conflict {
            id: ContractId::new(),
            status: ContractStatus::Deployed,
        });
        assert_eq!(err.kind(), ErrorKind::StatusConflict);
    }
}
