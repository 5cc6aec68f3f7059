//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `KeyVaultApi`
//! - **Driven Ports (Outbound)**: `KeyDirectory`, `BalanceSource`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
