//! # LX-04 Contract Lifecycle - Orchestrator and Confirmation Poller
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Drives a contract record from uploaded text to a confirmed on-ledger
//! deployment. Every operation checks existence, then ownership, then the
//! status transition, and only then calls the compiler or the ledger.
//!
//! ## State Machine
//!
//! ```text
//! UPLOADED → CLAUSES_EXTRACTED → SOLIDITY_PREPARED → SOLIDITY_GENERATED
//!                                        ↑                  │
//!                                        └── new source ────┤
//!                                                           ↓
//!                               TERMINATED ← CONFIRMED ← DEPLOYED
//!                                    ↑                       │
//!                                    └───────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Enforced by |
//! |-----------|-------------|
//! | Only the owner sees or changes a record | `rules::authorize_owner` |
//! | Deployed records are never edited, redeployed or deleted | `rules::ensure_not_deployed` |
//! | Writes race-free per record | `RecordStore::update` compare-and-set on the whole record |
//! | Failed compile or deploy leaves the record untouched | write happens last |
//! | TERMINATED is final | `ContractStatus::can_transition_to` |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `RecordStore` | Contract records (`InMemoryRecordStore`) |
//! | `IdentityProvider` | Current user (`StaticIdentity`) |
//! | `LedgerApi` | LX-03 ledger client |
//! | `SolidityCompiler` | LX-02 compiler adapter |

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod poller;
pub mod ports;
pub mod service;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use adapters::{InMemoryRecordStore, StaticIdentity};
pub use domain::{
    ArtifactChange, Caller, DeployedContract, DeploymentContext, RecordFilter, RecordPatch,
};
pub use errors::{LifecycleError, StoreError};
pub use poller::{ConfirmationPoller, PollReport, PollerConfig};
pub use ports::{ContractLifecycleApi, IdentityProvider, RecordStore};
pub use service::{LifecycleService, LifecycleStats};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapters::{InMemoryRecordStore, StaticIdentity};
    pub use crate::domain::{Caller, DeployedContract, DeploymentContext};
    pub use crate::errors::LifecycleError;
    pub use crate::poller::{ConfirmationPoller, PollerConfig};
    pub use crate::ports::{ContractLifecycleApi, IdentityProvider, RecordStore};
    pub use crate::service::LifecycleService;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
