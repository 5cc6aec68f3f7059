//! # Inbound Ports (Driving Ports)
//!
//! The key vault API exposed to the lifecycle layer and the API layer.

use crate::domain::{Credentials, WalletInfo};
use crate::errors::VaultError;
use async_trait::async_trait;
use shared_types::Address;

/// Key Material Manager API.
#[async_trait]
pub trait KeyVaultApi: Send + Sync {
    /// Generates, seals and registers a new wallet.
    async fn create_wallet(&self, label: &str) -> Result<WalletInfo, VaultError>;

    /// Lists wallets, re-scanning only when the key file set has changed.
    async fn list_wallets(&self) -> Result<Vec<WalletInfo>, VaultError>;

    /// Decrypts the key for `address`.
    async fn load_credentials(&self, address: Address) -> Result<Credentials, VaultError>;
}
