//! # LX-01 Key Vault - Key Material Manager
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Owns a directory of passphrase-sealed signing keys. Lists and creates
//! wallets, and decrypts credentials on demand for the ledger client.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Cache is a derived view of the directory | `service.rs` - fingerprint compare, full replace |
//! | A wallet exists only once its rename succeeded | `service.rs` - `create_wallet()` |
//! | Key material never leaves `Credentials` | `domain/entities.rs` - redacting `Debug` |
//! | Loaded key matches the requested address | `service.rs` - `load_credentials()` |
//!
//! ## Key File Lifecycle
//!
//! ```text
//! generate ──seal──→ .tmp-<uuid> ──rename──→ <label>--<0xaddress>.json
//!                          │
//!                          └── rename fails ──→ removed, WalletCreationFailed
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `KeyDirectory` | Key file storage (`FsKeyDirectory`) |
//! | `BalanceSource` | Live balances (ledger client) |
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use lx_01_key_vault::prelude::*;
//!
//! let vault = KeyVault::new(config, Arc::new(directory), ledger);
//! let wallet = vault.create_wallet("treasury").await?;
//! let creds = vault.load_credentials(wallet.address).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use adapters::FsKeyDirectory;
pub use domain::{Balance, Credentials, KeyFile, WalletInfo};
pub use errors::VaultError;
pub use ports::{BalanceSource, KeyDirectory, KeyVaultApi};
pub use service::{KeyVault, VaultConfig, VaultStats};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapters::FsKeyDirectory;
    pub use crate::domain::{Balance, Credentials, WalletInfo};
    pub use crate::errors::VaultError;
    pub use crate::ports::{BalanceSource, KeyDirectory, KeyVaultApi};
    pub use crate::service::{KeyVault, VaultConfig};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
