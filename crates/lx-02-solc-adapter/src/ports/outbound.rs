//! # Outbound Ports (Driven Ports)

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// True on exit code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program to completion.
///
/// Production: `TokioProcessRunner`
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args`, feeding `stdin` and capturing both output
    /// streams. Dropping the returned future must stop the process.
    async fn run(&self, program: &Path, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput>;
}
