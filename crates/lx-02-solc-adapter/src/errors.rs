//! # Error Types

use shared_types::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while compiling Solidity source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The toolchain rejected the source. Carries its diagnostics verbatim.
    #[error("compilation failed: {0}")]
    CompilationFailed(String),

    /// Nothing to compile.
    #[error("source text is empty")]
    EmptySource,

    /// The toolchain could not be started.
    #[error("solc unavailable: {0}")]
    ToolchainUnavailable(String),

    /// The toolchain did not finish in time.
    #[error("solc timed out after {0:?}")]
    Timeout(Duration),

    /// The toolchain output could not be parsed.
    #[error("malformed solc output: {0}")]
    MalformedOutput(String),

    /// The source compiled but holds no contract with creation bytecode.
    #[error("no deployable contract in source")]
    NoDeployableContract,
}

impl CompileError {
    /// Outcome category for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CompilationFailed(_)
            | Self::EmptySource
            | Self::ToolchainUnavailable(_)
            | Self::Timeout(_) => ErrorKind::CompilationFailed,
            Self::MalformedOutput(_) | Self::NoDeployableContract => ErrorKind::InvalidArtifact,
        }
    }
}
