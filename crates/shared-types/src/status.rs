//! # Contract Status
//!
//! The lifecycle state machine of a contract record.
//!
//! ```text
//! UPLOADED → CLAUSES_EXTRACTED → SOLIDITY_PREPARED → SOLIDITY_GENERATED
//!                                                          │
//!                                                          ↓
//!                                                      DEPLOYED ──→ CONFIRMED
//!                                                          │            │
//!                                                          └──→ TERMINATED ←┘
//! ```
//!
//! The declaration order is the lifecycle order, so `Ord` can be used for
//! "at or past" checks. TERMINATED sorts after CONFIRMED, which keeps the
//! CONFIRMED→TERMINATED regression non-decreasing.

use crate::errors::PrimitiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a contract record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    /// Raw contract text stored.
    Uploaded,
    /// Clause list extracted from the text.
    ClausesExtracted,
    /// Source text exists but has not been (re)compiled.
    SolidityPrepared,
    /// Bytecode and ABI are current for the stored source.
    SolidityGenerated,
    /// Submitted and included; the deployed address is known.
    Deployed,
    /// Code verified present on the ledger.
    Confirmed,
    /// Code absent or self-destructed.
    Terminated,
}

impl ContractStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ContractStatus; 7] = [
        Self::Uploaded,
        Self::ClausesExtracted,
        Self::SolidityPrepared,
        Self::SolidityGenerated,
        Self::Deployed,
        Self::Confirmed,
        Self::Terminated,
    ];

    /// Symbolic name, identical to the persisted form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "UPLOADED",
            Self::ClausesExtracted => "CLAUSES_EXTRACTED",
            Self::SolidityPrepared => "SOLIDITY_PREPARED",
            Self::SolidityGenerated => "SOLIDITY_GENERATED",
            Self::Deployed => "DEPLOYED",
            Self::Confirmed => "CONFIRMED",
            Self::Terminated => "TERMINATED",
        }
    }

    /// True at DEPLOYED or any later state.
    #[must_use]
    pub fn is_deployed(&self) -> bool {
        *self >= Self::Deployed
    }

    /// Whether `next` is reachable from `self` in a single step.
    ///
    /// Re-entering the current status is always allowed so retried writes
    /// stay idempotent.
    #[must_use]
    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (*self, next),
            (Uploaded, ClausesExtracted)
                | (ClausesExtracted, SolidityPrepared)
                | (SolidityPrepared, SolidityGenerated)
                | (SolidityGenerated, Deployed)
                | (Deployed, Confirmed)
                | (Deployed, Terminated)
                | (Confirmed, Terminated)
        )
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PrimitiveError::UnknownStatus(s.to_string()))
    }
}
