//! # Runtime Configuration
//!
//! One struct per subsystem, each with its own `Default`, overridden from
//! `LX_*` environment variables.
//!
//! ## Security Requirements
//!
//! - The keystore passphrase MUST be set; key files are never sealed with an
//!   empty passphrase.
//! - The chain id MUST be non-zero; it is part of every signature.

use lx_01_key_vault::VaultConfig;
use lx_02_solc_adapter::SolcConfig;
use lx_03_ledger_client::LedgerConfig;
use lx_04_contract_lifecycle::PollerConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Ledger client.
    pub ledger: LedgerConfig,
    /// Key vault.
    pub vault: VaultConfig,
    /// Compiler adapter.
    pub solc: SolcConfig,
    /// Confirmation poller.
    pub poller: PollerConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// Log output configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No keystore passphrase.
    #[error("keystore passphrase is empty; set LX_KEYSTORE_PASSPHRASE")]
    MissingPassphrase,

    /// Chain id zero.
    #[error("chain id must be non-zero; set LX_CHAIN_ID")]
    ZeroChainId,

    /// Receipt polling would never poll.
    #[error("receipt polling needs at least one attempt")]
    NoReceiptAttempts,

    /// Poller interval of zero.
    #[error("confirmation poll interval must be non-zero")]
    ZeroPollInterval,
}

impl RuntimeConfig {
    /// Refuse configurations that cannot work or would be unsafe.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vault.passphrase.is_empty() {
            return Err(ConfigError::MissingPassphrase);
        }
        if self.ledger.chain_id == 0 {
            return Err(ConfigError::ZeroChainId);
        }
        if self.ledger.receipt.max_attempts == 0 {
            return Err(ConfigError::NoReceiptAttempts);
        }
        if self.poller.interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Defaults overridden by whatever `lookup` returns for each `LX_*` key.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("LX_RPC_URL") {
            config.ledger.rpc_url = url;
        }
        if let Some(id) = parsed(&lookup, "LX_CHAIN_ID") {
            config.ledger.chain_id = id;
        }
        if let Some(secs) = parsed(&lookup, "LX_RPC_TIMEOUT_SECS") {
            config.ledger.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parsed(&lookup, "LX_RECEIPT_POLL_MS") {
            config.ledger.receipt.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = parsed(&lookup, "LX_RECEIPT_MAX_ATTEMPTS") {
            config.ledger.receipt.max_attempts = attempts;
        }

        if let Some(dir) = lookup("LX_KEYSTORE_DIR") {
            config.vault.keystore_dir = PathBuf::from(dir);
        }
        if let Some(passphrase) = lookup("LX_KEYSTORE_PASSPHRASE") {
            config.vault.passphrase = Zeroizing::new(passphrase);
        }

        if let Some(path) = lookup("LX_SOLC_PATH") {
            config.solc.solc_path = PathBuf::from(path);
        }
        if let Some(secs) = parsed(&lookup, "LX_SOLC_TIMEOUT_SECS") {
            config.solc.timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = parsed(&lookup, "LX_POLL_INTERVAL_SECS") {
            config.poller.interval = Duration::from_secs(secs);
        }

        if let Some(level) = lookup("LX_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.logging.log_level = level;
        }
        if let Some(flag) = lookup("LX_JSON_LOGS") {
            config.logging.json_logs = flag.eq_ignore_ascii_case("true") || flag == "1";
        }

        config
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> RuntimeConfig {
    RuntimeConfig::from_lookup(|key| std::env::var(key).ok())
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_need_a_passphrase() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config.ledger.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.ledger.chain_id, 1337);
        assert_eq!(config.ledger.receipt.ceiling(), Duration::from_secs(60));
        assert_eq!(config.poller.interval, Duration::from_secs(30));
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.validate(), Err(ConfigError::MissingPassphrase));
    }

    #[test]
    fn test_environment_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("LX_RPC_URL", "http://ledger:8545"),
            ("LX_CHAIN_ID", "31337"),
            ("LX_RECEIPT_POLL_MS", "500"),
            ("LX_RECEIPT_MAX_ATTEMPTS", "10"),
            ("LX_KEYSTORE_DIR", "/var/lib/lexchain/keys"),
            ("LX_KEYSTORE_PASSPHRASE", "correct horse"),
            ("LX_SOLC_PATH", "/usr/local/bin/solc-0.8.24"),
            ("LX_POLL_INTERVAL_SECS", "5"),
            ("RUST_LOG", "lx_03_ledger_client=debug"),
            ("LX_JSON_LOGS", "TRUE"),
        ]));

        assert_eq!(config.ledger.rpc_url, "http://ledger:8545");
        assert_eq!(config.ledger.chain_id, 31337);
        assert_eq!(config.ledger.receipt.ceiling(), Duration::from_secs(5));
        assert_eq!(config.vault.keystore_dir, PathBuf::from("/var/lib/lexchain/keys"));
        assert_eq!(config.solc.solc_path, PathBuf::from("/usr/local/bin/solc-0.8.24"));
        assert_eq!(config.poller.interval, Duration::from_secs(5));
        assert_eq!(config.logging.log_level, "lx_03_ledger_client=debug");
        assert!(config.logging.json_logs);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_unparsable_values_keep_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("LX_CHAIN_ID", "mainnet"),
            ("LX_KEYSTORE_PASSPHRASE", "pw"),
        ]));
        assert_eq!(config.ledger.chain_id, 1337);
    }

    #[test]
    fn test_zero_chain_id_rejected() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("LX_CHAIN_ID", "0"),
            ("LX_KEYSTORE_PASSPHRASE", "pw"),
        ]));
        assert_eq!(config.validate(), Err(ConfigError::ZeroChainId));
    }

    #[test]
    fn test_passphrase_not_in_debug_output() {
        let config = RuntimeConfig::from_lookup(lookup(&[("LX_KEYSTORE_PASSPHRASE", "hunter2")]));
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
