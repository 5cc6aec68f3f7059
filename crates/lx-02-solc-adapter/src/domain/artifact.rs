//! # Compiled Artifacts
//!
//! Parsing of `solc --combined-json abi,bin` output and selection of the
//! contract to deploy.
//!
//! ```json
//! {
//!   "contracts": {
//!     "<stdin>:Lease": { "abi": [ ... ], "bin": "6080..." }
//!   },
//!   "version": "0.8.24+commit.e11b9ed9"
//! }
//! ```
//!
//! Releases before 0.8 emit `abi` as a JSON-encoded string instead of an
//! array; both forms are accepted.

use crate::errors::CompileError;
use serde::Deserialize;
use shared_types::Bytes;
use std::collections::BTreeMap;

/// Bytecode and interface descriptor of one compiled contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    /// Contract name without the source unit prefix.
    pub contract_name: String,
    /// Creation bytecode.
    pub bytecode: Bytes,
    /// ABI as compact JSON text.
    pub abi: String,
}

#[derive(Deserialize)]
struct CombinedOutput {
    contracts: BTreeMap<String, CombinedContract>,
}

#[derive(Deserialize)]
struct CombinedContract {
    #[serde(default)]
    abi: serde_json::Value,
    #[serde(default)]
    bin: String,
}

/// Parses combined-json output and picks the contract to deploy.
///
/// Interfaces and abstract contracts have empty bytecode and are never
/// picked. When several contracts are deployable the one with the largest
/// bytecode wins, which is the contract inheriting from the others in
/// generated sources; ties go to the lexicographically last name.
pub fn select_artifact(stdout: &[u8]) -> Result<CompiledArtifact, CompileError> {
    let output: CombinedOutput = serde_json::from_slice(stdout)
        .map_err(|e| CompileError::MalformedOutput(e.to_string()))?;

    let mut best: Option<(String, Bytes, serde_json::Value)> = None;
    for (key, contract) in output.contracts {
        if contract.bin.trim().is_empty() {
            continue;
        }
        let bytecode = Bytes::from_hex(&contract.bin)
            .map_err(|e| CompileError::MalformedOutput(format!("{key}: {e}")))?;
        let replace = match &best {
            Some((_, current, _)) => bytecode.len() >= current.len(),
            None => true,
        };
        if replace {
            best = Some((key, bytecode, contract.abi));
        }
    }

    let (key, bytecode, abi) = best.ok_or(CompileError::NoDeployableContract)?;
    Ok(CompiledArtifact {
        contract_name: contract_name(&key).to_string(),
        bytecode,
        abi: abi_text(abi)?,
    })
}

/// `"<stdin>:Lease"` → `"Lease"`.
fn contract_name(key: &str) -> &str {
    key.rsplit_once(':').map_or(key, |(_, name)| name)
}

fn abi_text(abi: serde_json::Value) -> Result<String, CompileError> {
    let value = match abi {
        serde_json::Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| CompileError::MalformedOutput(format!("abi: {e}")))?,
        serde_json::Value::Null => serde_json::Value::Array(Vec::new()),
        other => other,
    };
    if !value.is_array() {
        return Err(CompileError::MalformedOutput("abi is not an array".into()));
    }
    Ok(value.to_string())
}
