//! # Domain Layer (Inner Hexagon)
//!
//! Wallet entities, the key file format and key file naming rules.
//! No I/O happens here.

pub mod entities;
pub mod naming;

pub use entities::*;
pub use naming::*;
