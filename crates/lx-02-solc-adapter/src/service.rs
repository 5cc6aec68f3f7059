//! # Solc Compiler Service
//!
//! Feeds source text to `solc` on stdin and parses its combined-json output.

use crate::domain::{select_artifact, CompiledArtifact};
use crate::errors::CompileError;
use crate::ports::{ProcessRunner, SolidityCompiler};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Compiler configuration.
#[derive(Debug, Clone)]
pub struct SolcConfig {
    /// Path or name of the `solc` binary.
    pub solc_path: PathBuf,
    /// Upper bound on one compilation.
    pub timeout: Duration,
    /// Pass `--optimize`.
    pub optimize: bool,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            solc_path: PathBuf::from("solc"),
            timeout: Duration::from_secs(60),
            optimize: false,
        }
    }
}

/// `SolidityCompiler` backed by the `solc` command line.
pub struct SolcCompiler<R: ProcessRunner> {
    config: SolcConfig,
    runner: Arc<R>,
}

impl<R: ProcessRunner> SolcCompiler<R> {
    /// Create a compiler using `runner` to start `solc`.
    pub fn new(config: SolcConfig, runner: Arc<R>) -> Self {
        Self { config, runner }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["--combined-json".to_string(), "abi,bin".to_string()];
        if self.config.optimize {
            args.push("--optimize".to_string());
        }
        args.push("-".to_string());
        args
    }
}

#[async_trait]
impl<R: ProcessRunner> SolidityCompiler for SolcCompiler<R> {
    #[instrument(skip(self, source), fields(source_len = source.len()))]
    async fn compile(&self, source: &str) -> Result<CompiledArtifact, CompileError> {
        if source.trim().is_empty() {
            return Err(CompileError::EmptySource);
        }

        let args = self.args();
        let run = self
            .runner
            .run(&self.config.solc_path, &args, source.as_bytes());
        let output = tokio::time::timeout(self.config.timeout, run)
            .await
            .map_err(|_| CompileError::Timeout(self.config.timeout))?
            .map_err(|e| {
                CompileError::ToolchainUnavailable(format!(
                    "{}: {e}",
                    self.config.solc_path.display()
                ))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.success() {
            warn!(exit_code = ?output.exit_code, "solc rejected source");
            return Err(CompileError::CompilationFailed(stderr.into_owned()));
        }
        if !stderr.trim().is_empty() {
            debug!(diagnostics = %stderr, "solc warnings");
        }

        let artifact = select_artifact(&output.stdout)?;
        info!(
            contract = %artifact.contract_name,
            bytecode_len = artifact.bytecode.len(),
            "Compiled contract"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ProcessOutput;
    use std::io;
    use std::path::Path;
    use std::sync::Mutex;

    /// Runner returning a canned result and recording what it was given.
    struct ScriptedRunner {
        result: Result<ProcessOutput, io::ErrorKind>,
        delay: Duration,
        seen: Mutex<Vec<(Vec<String>, Vec<u8>)>>,
    }

    impl ScriptedRunner {
        fn returning(exit_code: i32, stdout: &str, stderr: &str) -> Self {
            Self {
                result: Ok(ProcessOutput {
                    exit_code: Some(exit_code),
                    stdout: stdout.as_bytes().to_vec(),
                    stderr: stderr.as_bytes().to_vec(),
                }),
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, _program: &Path, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput> {
            tokio::time::sleep(self.delay).await;
            self.seen.lock().unwrap().push((args.to_vec(), stdin.to_vec()));
            self.result.clone().map_err(io::Error::from)
        }
    }

    const OK_OUTPUT: &str =
        r#"{"contracts":{"<stdin>:Lease":{"abi":[],"bin":"600160"}},"version":"0.8.24"}"#;

    #[tokio::test]
    async fn test_compiles_via_stdin() {
        let runner = Arc::new(ScriptedRunner::returning(0, OK_OUTPUT, ""));
        let compiler = SolcCompiler::new(SolcConfig::default(), runner.clone());

        let artifact = compiler.compile("contract Lease {}").await.unwrap();
        assert_eq!(artifact.bytecode.to_hex(), "0x600160");
        assert_eq!(artifact.abi, "[]");

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].0, vec!["--combined-json", "abi,bin", "-"]);
        assert_eq!(seen[0].1, b"contract Lease {}");
    }

    #[tokio::test]
    async fn test_diagnostics_are_carried_verbatim() {
        let diag = "Error: Expected ';' but got '}'\n --> <stdin>:3:1:\n";
        let runner = Arc::new(ScriptedRunner::returning(1, "", diag));
        let compiler = SolcCompiler::new(SolcConfig::default(), runner);

        let err = compiler.compile("contract X { uint a }").await.unwrap_err();
        assert_eq!(err, CompileError::CompilationFailed(diag.to_string()));
        assert_eq!(err.kind(), shared_types::ErrorKind::CompilationFailed);
    }

    #[tokio::test]
    async fn test_empty_source_never_runs_solc() {
        let runner = Arc::new(ScriptedRunner::returning(0, OK_OUTPUT, ""));
        let compiler = SolcCompiler::new(SolcConfig::default(), runner.clone());

        assert_eq!(compiler.compile("  \n").await, Err(CompileError::EmptySource));
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_toolchain() {
        let runner = Arc::new(ScriptedRunner {
            result: Err(io::ErrorKind::NotFound),
            delay: Duration::ZERO,
            seen: Mutex::new(Vec::new()),
        });
        let compiler = SolcCompiler::new(SolcConfig::default(), runner);
        assert!(matches!(
            compiler.compile("contract A {}").await,
            Err(CompileError::ToolchainUnavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let mut runner = ScriptedRunner::returning(0, OK_OUTPUT, "");
        runner.delay = Duration::from_secs(120);
        let config = SolcConfig {
            timeout: Duration::from_secs(5),
            ..SolcConfig::default()
        };
        let compiler = SolcCompiler::new(config, Arc::new(runner));

        assert_eq!(
            compiler.compile("contract A {}").await,
            Err(CompileError::Timeout(Duration::from_secs(5)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_arguments_survive_a_slow_runner() {
        let mut runner = ScriptedRunner::returning(0, OK_OUTPUT, "");
        runner.delay = Duration::from_secs(10);
        let runner = Arc::new(runner);
        let compiler = SolcCompiler::new(SolcConfig::default(), runner.clone());

        compiler.compile("contract Lease {}").await.unwrap();
        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].0, vec!["--combined-json", "abi,bin", "-"]);
    }

    #[tokio::test]
    async fn test_optimize_flag() {
        let runner = Arc::new(ScriptedRunner::returning(0, OK_OUTPUT, ""));
        let config = SolcConfig {
            optimize: true,
            ..SolcConfig::default()
        };
        SolcCompiler::new(config, runner.clone())
            .compile("contract A {}")
            .await
            .unwrap();
        assert!(runner.seen.lock().unwrap()[0].0.contains(&"--optimize".to_string()));
    }
}
