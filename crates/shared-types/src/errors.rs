//! # Error Types
//!
//! The outcome categories every subsystem error maps onto, plus errors for
//! malformed primitives.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Outcome category of a failed operation.
///
/// Callers decide retry vs. abort vs. surface-to-user from the kind alone;
/// the accompanying message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No record carries the requested identifier or address.
    RecordNotFound,
    /// Caller is not the record owner (or is not authenticated).
    Unauthorized,
    /// Deletion or mutation refused because the record is at or past DEPLOYED.
    AlreadyConfirmed,
    /// Bytecode or ABI missing or malformed, or an argument could not be encoded.
    InvalidArtifact,
    /// The compiler toolchain rejected the source.
    CompilationFailed,
    /// Gas simulation errored or returned zero.
    GasEstimationFailed,
    /// Submission failed or no receipt arrived in time.
    DeploymentFailed,
    /// Address text is not a 20-byte hex value.
    InvalidAddress,
    /// Transport or ledger-node failure.
    ConnectionError,
    /// Key generation, persistence or rename failed.
    WalletCreationFailed,
    /// No wallet matches, or its key file cannot be decrypted.
    WalletNotFound,
    /// The lifecycle state machine forbids the requested transition.
    InvalidStatusTransition,
    /// The record changed between read and write.
    StatusConflict,
    /// A contract call executed and reverted.
    ContractReverted,
}

impl ErrorKind {
    /// Returns true if retrying the same call may succeed without any change
    /// on the caller's side.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError | Self::DeploymentFailed | Self::StatusConflict
        )
    }

    /// Symbolic name, identical to the serialized form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AlreadyConfirmed => "ALREADY_CONFIRMED",
            Self::InvalidArtifact => "INVALID_ARTIFACT",
            Self::CompilationFailed => "COMPILATION_FAILED",
            Self::GasEstimationFailed => "GAS_ESTIMATION_FAILED",
            Self::DeploymentFailed => "DEPLOYMENT_FAILED",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::WalletCreationFailed => "WALLET_CREATION_FAILED",
            Self::WalletNotFound => "WALLET_NOT_FOUND",
            Self::InvalidStatusTransition => "INVALID_STATUS_TRANSITION",
            Self::StatusConflict => "STATUS_CONFLICT",
            Self::ContractReverted => "CONTRACT_REVERTED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while parsing ledger primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Not a 20-byte hex address.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// Not a 32-byte hex hash.
    #[error("invalid hash: {0:?}")]
    InvalidHash(String),

    /// Not valid hex.
    #[error("invalid hex: {0:?}")]
    InvalidHex(String),

    /// Not a valid JSON-RPC quantity.
    #[error("invalid quantity: {0:?}")]
    InvalidQuantity(String),

    /// Unknown lifecycle status name.
    #[error("unknown contract status: {0:?}")]
    UnknownStatus(String),

    /// Not a valid contract identifier.
    #[error("invalid contract id: {0:?}")]
    InvalidId(String),
}

impl PrimitiveError {
    /// Outcome category for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::InvalidHash(_) | Self::InvalidQuantity(_) => ErrorKind::ConnectionError,
            Self::InvalidHex(_) | Self::UnknownStatus(_) => ErrorKind::InvalidArtifact,
            Self::InvalidId(_) => ErrorKind::RecordNotFound,
        }
    }
}
