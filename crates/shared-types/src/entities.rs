//! # Core Domain Entities
//!
//! The contract record as persisted by the record store, and the typed
//! constructor/function arguments callers hand to the ledger.
//!
//! ## Persisted Layout
//!
//! | Field | Type | Present |
//! |-------|------|---------|
//! | `id` | UUID string | always |
//! | `userId` | string | always |
//! | `contractText` | string | always |
//! | `extractedClauses` | string list | from CLAUSES_EXTRACTED |
//! | `soliditySource` | string | from SOLIDITY_PREPARED |
//! | `binary` | hex string | with `abi` |
//! | `abi` | JSON text | with `binary` |
//! | `deployedAddress` | hex string | iff status ≥ DEPLOYED |
//! | `status` | symbolic name | always |

use crate::errors::PrimitiveError;
use crate::primitives::{Address, Bytes, U256};
use crate::status::ContractStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// IDENTITY
// =============================================================================

/// Opaque, immutable record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub Uuid);

impl ContractId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContractId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ContractId {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| PrimitiveError::InvalidId(s.to_string()))
    }
}

// =============================================================================
// CONTRACT RECORD
// =============================================================================

/// A contract tracked from text upload through on-chain confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    /// Record identity, assigned once at upload.
    pub id: ContractId,
    /// Owner's user identifier.
    pub user_id: String,
    /// Raw contract text.
    pub contract_text: String,
    /// Clause list, set by extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_clauses: Option<Vec<String>>,
    /// Generated Solidity source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solidity_source: Option<String>,
    /// Compiled creation bytecode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<Bytes>,
    /// Interface descriptor (ABI JSON text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<String>,
    /// Ledger address of the deployed instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_address: Option<Address>,
    /// Lifecycle status.
    pub status: ContractStatus,
}

impl ContractRecord {
    /// A freshly uploaded record.
    #[must_use]
    pub fn uploaded(user_id: impl Into<String>, contract_text: impl Into<String>) -> Self {
        Self {
            id: ContractId::new(),
            user_id: user_id.into(),
            contract_text: contract_text.into(),
            extracted_clauses: None,
            solidity_source: None,
            binary: None,
            abi: None,
            deployed_address: None,
            status: ContractStatus::Uploaded,
        }
    }

    /// True if `user_id` owns this record.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Compiled bytecode, if present and non-empty.
    #[must_use]
    pub fn bytecode(&self) -> Option<&Bytes> {
        self.binary.as_ref().filter(|b| !b.is_empty())
    }

    /// Checks the structural invariants of the record.
    pub fn check_invariants(&self) -> Result<(), RecordInvariantError> {
        if self.binary.is_some() != self.abi.is_some() {
            return Err(RecordInvariantError::UnpairedArtifact);
        }
        match (self.status.is_deployed(), self.deployed_address.is_some()) {
            (true, false) => Err(RecordInvariantError::MissingAddress(self.status)),
            (false, true) => Err(RecordInvariantError::UnexpectedAddress(self.status)),
            _ => Ok(()),
        }
    }
}

/// A structural invariant of [`ContractRecord`] is broken.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RecordInvariantError {
    /// Exactly one of `binary` / `abi` is set.
    #[error("bytecode and abi must be stored together")]
    UnpairedArtifact,

    /// Deployed-or-later status without an address.
    #[error("status {0} requires a deployed address")]
    MissingAddress(ContractStatus),

    /// Address present before deployment.
    #[error("status {0} must not carry a deployed address")]
    UnexpectedAddress(ContractStatus),
}

// =============================================================================
// CALL ARGUMENTS
// =============================================================================

/// A typed constructor or function argument.
///
/// Callers choose the variant. Only the ledger client's untyped deployment
/// entry point infers one from a JSON value's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstructorArg {
    /// 20-byte address.
    Address(Address),
    /// Unsigned 256-bit integer.
    Uint(U256),
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Bool(bool),
}

impl ConstructorArg {
    /// Canonical ABI type name used in signatures.
    #[must_use]
    pub fn abi_type(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Uint(_) => "uint256",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
        }
    }

    /// True for types encoded out-of-line in the ABI tail.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::String(_))
    }
}

impl From<Address> for ConstructorArg {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<U256> for ConstructorArg {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for ConstructorArg {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<bool> for ConstructorArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ConstructorArg {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
