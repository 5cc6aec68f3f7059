//! # Error Types
//!
//! All error types for the key vault.

use shared_types::ErrorKind;
use thiserror::Error;

/// Errors raised by the key vault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Key generation, sealing, writing or renaming failed.
    #[error("wallet creation failed: {0}")]
    WalletCreationFailed(String),

    /// No wallet with this address, or its key file could not be opened.
    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    /// The keystore directory could not be read.
    #[error("keystore unavailable: {0}")]
    KeystoreUnavailable(String),

    /// The balance lookup failed.
    #[error("balance unavailable: {0}")]
    BalanceUnavailable(String),
}

impl VaultError {
    /// Outcome category for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WalletCreationFailed(_) => ErrorKind::WalletCreationFailed,
            Self::WalletNotFound(_) | Self::KeystoreUnavailable(_) => ErrorKind::WalletNotFound,
            Self::BalanceUnavailable(_) => ErrorKind::ConnectionError,
        }
    }
}
