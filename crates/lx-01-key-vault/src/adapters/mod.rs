//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the vault's outbound ports.

pub mod fs_directory;

pub use fs_directory::*;
