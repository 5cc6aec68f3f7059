//! # Outbound Ports (Driven Ports)
//!
//! What the vault needs from the host: a directory of key files and a way to
//! read balances.

use async_trait::async_trait;
use shared_types::{Address, U256};
use std::io;

/// A flat directory holding key files.
///
/// Production: `FsKeyDirectory`
#[async_trait]
pub trait KeyDirectory: Send + Sync {
    /// Names of all entries in the directory (not only key files).
    async fn list(&self) -> io::Result<Vec<String>>;

    /// Reads one entry.
    async fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Writes `contents` under a fresh temporary name and returns that name.
    async fn write_temp(&self, contents: &[u8]) -> io::Result<String>;

    /// Renames an entry. Fails if the rename cannot be completed.
    async fn rename(&self, from: &str, to: &str) -> io::Result<()>;

    /// Removes an entry.
    async fn remove(&self, name: &str) -> io::Result<()>;
}

/// Live balance lookups.
///
/// Production: the ledger client.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Balance of `address` in the ledger's smallest unit.
    async fn balance_of(&self, address: Address) -> Result<U256, crate::VaultError>;
}
