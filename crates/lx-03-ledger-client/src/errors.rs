//! # Error Types
//!
//! `RpcError` is what a transport reports; `LedgerError` is what the ledger
//! client reports to its callers.

use serde_json::Value;
use shared_types::{ErrorKind, PrimitiveError};
use thiserror::Error;

/// Failure of a single JSON-RPC round trip.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    /// The node could not be reached or answered with a non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Node-supplied message, carried verbatim.
        message: String,
        /// Optional revert data or detail.
        data: Option<Value>,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl RpcError {
    /// True if the node reports that execution reverted.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        match self {
            Self::Rpc { message, .. } => message.to_ascii_lowercase().contains("revert"),
            _ => false,
        }
    }

    /// The node's own message for RPC errors, the display form otherwise.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors raised by the ledger client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Transport or node failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Empty bytecode, undecodable return data or an unencodable argument.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    /// Simulation failed or returned zero gas.
    #[error("gas estimation failed: {0}")]
    GasEstimationFailed(String),

    /// Submission was rejected, the transaction failed, or no receipt arrived.
    #[error("deployment failed: {0}")]
    DeploymentFailed(String),

    /// Malformed address text.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A read-only call reverted.
    #[error("execution reverted: {0}")]
    Reverted(String),
}

impl LedgerError {
    /// Outcome category for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::ConnectionError,
            Self::Reverted(_) => ErrorKind::ContractReverted,
            Self::InvalidArtifact(_) => ErrorKind::InvalidArtifact,
            Self::GasEstimationFailed(_) => ErrorKind::GasEstimationFailed,
            Self::DeploymentFailed(_) => ErrorKind::DeploymentFailed,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
        }
    }

    /// Receipt polling gave up.
    #[must_use]
    pub fn receipt_not_found() -> Self {
        Self::DeploymentFailed("receipt not found".into())
    }

    /// Receipt polling was interrupted by shutdown.
    #[must_use]
    pub fn polling_cancelled() -> Self {
        Self::DeploymentFailed("receipt polling cancelled".into())
    }
}

impl From<RpcError> for LedgerError {
    fn from(err: RpcError) -> Self {
        if err.is_revert() {
            Self::Reverted(err.detail())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl From<PrimitiveError> for LedgerError {
    fn from(err: PrimitiveError) -> Self {
        match err {
            PrimitiveError::InvalidAddress(_) => Self::InvalidAddress(err.to_string()),
            other => Self::Connection(format!("unexpected node value: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc(message: &str) -> RpcError {
        RpcError::Rpc {
            code: 3,
            message: message.into(),
            data: None,
        }
    }

    #[test]
    fn test_revert_classification() {
        assert!(rpc("execution reverted").is_revert());
        assert!(rpc("VM Exception while processing transaction: Revert").is_revert());
        assert!(!rpc("nonce too low").is_revert());
        assert!(!RpcError::Transport("revert".into()).is_revert());
    }

    #[test]
    fn test_rpc_error_conversion() {
        assert_eq!(
            LedgerError::from(rpc("execution reverted")),
            LedgerError::Reverted("execution reverted".into())
        );
        assert_eq!(
            LedgerError::from(rpc("execution reverted")).kind(),
            ErrorKind::ContractReverted
        );
        assert!(!ErrorKind::ContractReverted.is_transient());
        assert_eq!(
            LedgerError::from(RpcError::Transport("refused".into())).kind(),
            ErrorKind::ConnectionError
        );
    }

    #[test]
    fn test_receipt_errors_are_deployment_failures() {
        assert_eq!(LedgerError::receipt_not_found().kind(), ErrorKind::DeploymentFailed);
        assert_eq!(
            LedgerError::receipt_not_found().to_string(),
            "deployment failed: receipt not found"
        );
    }
}
