//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `SolidityCompiler`
//! - **Driven Ports (Outbound)**: `ProcessRunner`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
