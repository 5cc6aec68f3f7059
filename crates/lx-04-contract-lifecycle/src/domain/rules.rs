//! # Lifecycle Rules
//!
//! Ownership and transition checks, applied before any side effect.

use super::Caller;
use crate::errors::LifecycleError;
use shared_types::{ContractRecord, ContractStatus};

/// The caller must be the record's owner.
///
/// `System` is refused here; it only drives status updates by address.
pub fn authorize_owner(caller: &Caller, record: &ContractRecord) -> Result<(), LifecycleError> {
    match caller {
        Caller::User(user_id) if record.is_owned_by(user_id) => Ok(()),
        Caller::User(user_id) => Err(LifecycleError::Unauthorized(format!(
            "user {user_id} does not own contract {}",
            record.id
        ))),
        Caller::Anonymous => Err(LifecycleError::Unauthorized("not authenticated".into())),
        Caller::System => Err(LifecycleError::Unauthorized(
            "system caller may only update status by address".into(),
        )),
    }
}

/// Owner or `System`, for status updates driven by the ledger.
pub fn authorize_status_update(
    caller: &Caller,
    record: &ContractRecord,
) -> Result<(), LifecycleError> {
    match caller {
        Caller::System => Ok(()),
        other => authorize_owner(other, record),
    }
}

/// Refuses mutation of deployed records.
pub fn ensure_not_deployed(record: &ContractRecord) -> Result<(), LifecycleError> {
    if record.status.is_deployed() {
        return Err(LifecycleError::AlreadyConfirmed(record.status));
    }
    Ok(())
}

/// The state machine must allow `from → to`.
pub fn ensure_transition(from: ContractStatus, to: ContractStatus) -> Result<(), LifecycleError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidStatusTransition { from, to })
    }
}

/// The record must be live on the ledger (DEPLOYED or CONFIRMED).
pub fn ensure_live(record: &ContractRecord) -> Result<(), LifecycleError> {
    match record.status {
        ContractStatus::Deployed | ContractStatus::Confirmed => Ok(()),
        ContractStatus::Terminated => Err(LifecycleError::InvalidStatusTransition {
            from: ContractStatus::Terminated,
            to: ContractStatus::Confirmed,
        }),
        other => Err(LifecycleError::InvalidStatusTransition {
            from: other,
            to: ContractStatus::Deployed,
        }),
    }
}
