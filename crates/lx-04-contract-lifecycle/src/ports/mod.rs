//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `ContractLifecycleApi`
//! - **Driven Ports (Outbound)**: `RecordStore`, `IdentityProvider`
//!
//! The ledger and compiler seams are the `LedgerApi` and `SolidityCompiler`
//! traits of their own crates.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
