//! # Inbound Ports (Driving Ports)

use crate::domain::CompiledArtifact;
use crate::errors::CompileError;
use async_trait::async_trait;

/// Compiles Solidity source into a deployable artifact.
#[async_trait]
pub trait SolidityCompiler: Send + Sync {
    /// Compile `source`. Toolchain diagnostics are returned unmodified in
    /// `CompileError::CompilationFailed`.
    async fn compile(&self, source: &str) -> Result<CompiledArtifact, CompileError>;
}
