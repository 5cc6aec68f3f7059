//! # Subsystem Container
//!
//! Configuration and construction of every LexChain subsystem.

pub mod config;
pub mod subsystems;

pub use config::{load_config, ConfigError, LoggingConfig, RuntimeConfig};
pub use subsystems::{ContainerError, SubsystemContainer};
