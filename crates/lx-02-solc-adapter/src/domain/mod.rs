//! # Domain Layer (Inner Hexagon)
//!
//! Compiler output parsing. No process handling happens here.

pub mod artifact;

pub use artifact::*;
