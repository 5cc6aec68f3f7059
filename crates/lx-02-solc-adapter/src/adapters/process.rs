//! Child process runner on tokio.

use crate::ports::{ProcessOutput, ProcessRunner};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &Path, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(stdin).await?;
            // Closing stdin signals end of source.
            drop(pipe);
        }

        let output = child.wait_with_output().await?;
        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feeds_stdin_and_captures_stdout() {
        let out = TokioProcessRunner
            .run(Path::new("cat"), &[], b"pragma solidity")
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, b"pragma solidity");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = TokioProcessRunner
            .run(Path::new("/nonexistent/solc"), &[], b"")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
