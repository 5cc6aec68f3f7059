//! # LX-02 Solc Adapter - Compiler Boundary
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Purpose
//!
//! Turns Solidity source text into creation bytecode plus an ABI, or a
//! structured failure carrying the toolchain's diagnostics unmodified.
//!
//! ## Invocation
//!
//! ```text
//! source ──stdin──→ solc --combined-json abi,bin [--optimize] - ──stdout──→ artifact
//!                                                               └─stderr──→ CompilationFailed
//! ```
//!
//! | Failure | Error | Kind |
//! |---------|-------|------|
//! | Non-zero exit | `CompilationFailed(stderr)` | COMPILATION_FAILED |
//! | Binary missing | `ToolchainUnavailable` | COMPILATION_FAILED |
//! | Exceeded `SolcConfig::timeout` | `Timeout` | COMPILATION_FAILED |
//! | Unparseable output | `MalformedOutput` | INVALID_ARTIFACT |
//! | Only interfaces | `NoDeployableContract` | INVALID_ARTIFACT |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::TokioProcessRunner;
pub use domain::{select_artifact, CompiledArtifact};
pub use errors::CompileError;
pub use ports::{ProcessOutput, ProcessRunner, SolidityCompiler};
pub use service::{SolcCompiler, SolcConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
