//! # Adapters Layer (Outer Hexagon)

pub mod identity;
pub mod memory_store;

pub use identity::StaticIdentity;
pub use memory_store::InMemoryRecordStore;
