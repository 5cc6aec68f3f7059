//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `LedgerApi`
//! - **Driven Ports (Outbound)**: `RpcTransport`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
