//! # LX-03 Ledger Client - JSON-RPC Ledger Boundary
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Encodes constructor and function calls, estimates gas, signs and submits
//! legacy EIP-155 transactions, polls for receipts, and answers code
//! existence and balance queries against a single configured node.
//!
//! ## Deployment Flow
//!
//! ```text
//! bytecode ‖ encode_args(args)
//!      │
//!      ├── eth_getTransactionCount(from, pending) ──→ nonce
//!      ├── eth_gasPrice + eth_estimateGas ──────────→ (price, simulated × 2)
//!      ├── sign (secp256k1, EIP-155) ───────────────→ eth_sendRawTransaction
//!      └── eth_getTransactionReceipt × 40, every 1.5 s ──→ contract address
//!                                                   └──→ DeploymentFailed("receipt not found")
//! ```
//!
//! ## Existence Check
//!
//! | `eth_getCode` | destroyed-getter check | Result |
//! |---------------|-----------------|--------|
//! | empty | not called | `false` |
//! | code | reverts | `false` |
//! | code | returns or fails otherwise | `true` |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `RpcTransport` | JSON-RPC round trips (`HttpRpcTransport`, `ScriptedTransport`) |

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

pub use adapters::{HttpRpcTransport, RecordedCall, ScriptedTransport};
pub use domain::{
    AddressResolution, CallParams, Deployment, GasQuote, LegacyTransaction, SignedTransaction,
    TransactionReceipt,
};
pub use errors::{LedgerError, RpcError};
pub use ports::{LedgerApi, RpcTransport};
pub use service::{LedgerClient, LedgerConfig, LedgerStats, ReceiptPolicy, GAS_LIMIT_MULTIPLIER};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::adapters::HttpRpcTransport;
    pub use crate::domain::{AddressResolution, CallParams, Deployment, GasQuote};
    pub use crate::errors::LedgerError;
    pub use crate::ports::{LedgerApi, RpcTransport};
    pub use crate::service::{LedgerClient, LedgerConfig, ReceiptPolicy};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
