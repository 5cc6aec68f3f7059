//! # Shared Types Crate
//!
//! Ledger primitives, the contract record model and the error taxonomy used
//! by every LexChain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the persisted record layout (`ContractRecord`)
//!   and the lifecycle ordering (`ContractStatus`) are defined once, here.
//! - **Symbolic Persistence**: statuses are stored by name, never by ordinal,
//!   so new states can be inserted between existing ones.
//! - **Typed Categories**: every subsystem error maps onto an `ErrorKind` so
//!   callers never branch on message text.

pub mod entities;
pub mod errors;
pub mod primitives;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use primitives::*;
pub use status::*;
