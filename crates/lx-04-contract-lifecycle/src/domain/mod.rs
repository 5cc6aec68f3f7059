//! # Domain Layer (Inner Hexagon)

pub mod caller;
pub mod context;
pub mod records;
pub mod rules;

pub use caller::Caller;
pub use context::{DeployedContract, DeploymentContext};
pub use records::{ArtifactChange, RecordFilter, RecordPatch};
