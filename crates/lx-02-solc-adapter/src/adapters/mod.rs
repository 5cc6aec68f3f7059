//! # Adapters Layer (Outer Hexagon)

pub mod process;

pub use process::*;
