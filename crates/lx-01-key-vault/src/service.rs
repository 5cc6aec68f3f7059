//! # Key Vault Service
//!
//! Owns the keystore directory and the wallet listing cache.
//!
//! ## Cache Discipline
//!
//! The cache is a derived view of the directory. Every `list_wallets` call
//! recomputes the directory fingerprint; a changed fingerprint replaces the
//! whole cache from a fresh scan, an unchanged one returns the cached list
//! without reading any key file.

use crate::domain::{
    fingerprint, is_key_file, key_file_name, sanitize_label, Balance, CachedWallet, Credentials,
    KeyFile, WalletInfo,
};
use crate::errors::VaultError;
use crate::ports::{BalanceSource, KeyDirectory, KeyVaultApi};
use async_trait::async_trait;
use shared_crypto::{open_secret, seal_secret, KdfParams, Secp256k1KeyPair};
use shared_types::Address;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

/// Key vault configuration.
#[derive(Clone)]
pub struct VaultConfig {
    /// Directory holding key files.
    pub keystore_dir: PathBuf,
    /// Passphrase sealing every key file.
    pub passphrase: Zeroizing<String>,
    /// Argon2id cost for newly created key files.
    pub kdf: KdfParams,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            keystore_dir: PathBuf::from("./data/keystore"),
            passphrase: Zeroizing::new(String::new()),
            kdf: KdfParams::default(),
        }
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("keystore_dir", &self.keystore_dir)
            .field("passphrase", &"<redacted>")
            .field("kdf", &self.kdf)
            .finish()
    }
}

/// Vault statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VaultStats {
    /// Full directory re-scans.
    pub rescans: u64,
    /// Listings served from the cache.
    pub cache_hits: u64,
    /// Wallets created by this process.
    pub wallets_created: u64,
}

#[derive(Default)]
struct StatCounters {
    rescans: AtomicU64,
    cache_hits: AtomicU64,
    wallets_created: AtomicU64,
}

#[derive(Default)]
struct WalletCache {
    /// `None` until the first scan.
    fingerprint: Option<String>,
    wallets: Vec<CachedWallet>,
}

impl WalletCache {
    fn infos(&self) -> Vec<WalletInfo> {
        self.wallets.iter().map(|w| w.info.clone()).collect()
    }

    fn file_for(&self, address: &Address) -> Option<String> {
        self.wallets
            .iter()
            .find(|w| w.info.address == *address)
            .map(|w| w.file_name.clone())
    }
}

/// The Key Material Manager.
pub struct KeyVault<D: KeyDirectory, B: BalanceSource> {
    config: VaultConfig,
    directory: Arc<D>,
    balances: Arc<B>,
    cache: Mutex<WalletCache>,
    stats: StatCounters,
}

impl<D: KeyDirectory, B: BalanceSource> KeyVault<D, B> {
    /// Create a new vault over `directory`.
    pub fn new(config: VaultConfig, directory: Arc<D>, balances: Arc<B>) -> Self {
        Self {
            config,
            directory,
            balances,
            cache: Mutex::new(WalletCache::default()),
            stats: StatCounters::default(),
        }
    }

    /// Get current vault statistics.
    pub fn stats(&self) -> VaultStats {
        VaultStats {
            rescans: self.stats.rescans.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            wallets_created: self.stats.wallets_created.load(Ordering::Relaxed),
        }
    }

    async fn fetch_balance(&self, address: Address) -> Balance {
        match self.balances.balance_of(address).await {
            Ok(wei) => Balance::Known(wei),
            Err(e) => {
                debug!(%address, error = %e, "Balance lookup failed");
                Balance::Unavailable
            }
        }
    }

    /// Reads every key file in `names`, skipping unreadable ones.
    async fn scan(&self, names: &[String]) -> Vec<CachedWallet> {
        let mut key_files: Vec<&String> = names.iter().filter(|n| is_key_file(n)).collect();
        key_files.sort_unstable();

        let mut wallets = Vec::with_capacity(key_files.len());
        for name in key_files {
            let parsed = match self.directory.read(name).await {
                Ok(bytes) => KeyFile::from_json(&bytes),
                Err(e) => Err(VaultError::KeystoreUnavailable(e.to_string())),
            };
            match parsed {
                Ok(file) => {
                    let balance = self.fetch_balance(file.address).await;
                    wallets.push(CachedWallet {
                        info: WalletInfo {
                            label: file.label,
                            address: file.address,
                            balance,
                        },
                        file_name: name.clone(),
                    });
                }
                Err(e) => warn!(file = %name, error = %e, "Skipping unreadable key file"),
            }
        }
        wallets
    }

    async fn cached_file(&self, address: &Address) -> Option<String> {
        self.cache.lock().await.file_for(address)
    }
}

#[async_trait]
impl<D: KeyDirectory, B: BalanceSource> KeyVaultApi for KeyVault<D, B> {
    #[instrument(skip(self))]
    async fn create_wallet(&self, label: &str) -> Result<WalletInfo, VaultError> {
        let label = sanitize_label(label);
        let key_pair = Secp256k1KeyPair::generate();
        let address = Address::new(key_pair.address());

        let secret = Zeroizing::new(key_pair.to_bytes());
        let passphrase = self.config.passphrase.clone();
        let kdf = self.config.kdf;
        let sealed = tokio::task::spawn_blocking(move || {
            seal_secret(passphrase.as_bytes(), &secret, kdf)
        })
        .await
        .map_err(|e| VaultError::WalletCreationFailed(e.to_string()))?
        .map_err(|e| VaultError::WalletCreationFailed(e.to_string()))?;

        let document = KeyFile::new(address, &label, &sealed).to_json()?;
        let temp_name = self
            .directory
            .write_temp(&document)
            .await
            .map_err(|e| VaultError::WalletCreationFailed(format!("write key file: {e}")))?;

        let file_name = key_file_name(&label, &address);
        if let Err(e) = self.directory.rename(&temp_name, &file_name).await {
            if let Err(cleanup) = self.directory.remove(&temp_name).await {
                warn!(file = %temp_name, error = %cleanup, "Failed to remove temporary key file");
            }
            return Err(VaultError::WalletCreationFailed(format!(
                "rename {temp_name} -> {file_name}: {e}"
            )));
        }

        let balance = self.fetch_balance(address).await;
        let info = WalletInfo {
            label,
            address,
            balance,
        };

        {
            let mut cache = self.cache.lock().await;
            if let Some(previous) = cache.fingerprint.take() {
                let updated = fingerprint(previous.split('\n').chain([file_name.as_str()]));
                cache.fingerprint = Some(updated);
            }
            cache.wallets.push(CachedWallet {
                info: info.clone(),
                file_name: file_name.clone(),
            });
            cache.wallets.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        }
        self.stats.wallets_created.fetch_add(1, Ordering::Relaxed);

        info!(%address, file = %file_name, "Created wallet");
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn list_wallets(&self) -> Result<Vec<WalletInfo>, VaultError> {
        let names = self
            .directory
            .list()
            .await
            .map_err(|e| VaultError::KeystoreUnavailable(e.to_string()))?;
        let current = fingerprint(names.iter().map(String::as_str));

        let mut cache = self.cache.lock().await;
        if cache.fingerprint.as_deref() == Some(current.as_str()) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cache.infos());
        }

        debug!("Keystore changed, re-scanning");
        let wallets = self.scan(&names).await;
        cache.fingerprint = Some(current);
        cache.wallets = wallets;
        self.stats.rescans.fetch_add(1, Ordering::Relaxed);

        info!(wallets = cache.wallets.len(), "Keystore scanned");
        Ok(cache.infos())
    }

    #[instrument(skip(self))]
    async fn load_credentials(&self, address: Address) -> Result<Credentials, VaultError> {
        let file_name = match self.cached_file(&address).await {
            Some(name) => name,
            None => {
                // The key file may have been added since the last listing.
                self.list_wallets().await?;
                self.cached_file(&address)
                    .await
                    .ok_or_else(|| VaultError::WalletNotFound(address.to_string()))?
            }
        };

        let bytes = self
            .directory
            .read(&file_name)
            .await
            .map_err(|e| VaultError::WalletNotFound(format!("{address}: {e}")))?;
        let sealed = KeyFile::from_json(&bytes)?.sealed_secret()?;

        let passphrase = self.config.passphrase.clone();
        let key_pair = tokio::task::spawn_blocking(move || {
            let secret = open_secret(passphrase.as_bytes(), &sealed)?;
            Secp256k1KeyPair::from_bytes(*secret)
        })
        .await
        .map_err(|e| VaultError::WalletNotFound(e.to_string()))?
        .map_err(|e| VaultError::WalletNotFound(format!("{address}: {e}")))?;

        if key_pair.address() != *address.as_bytes() {
            return Err(VaultError::WalletNotFound(format!(
                "{address}: key file holds a different key"
            )));
        }

        debug!("Loaded credentials");
        Ok(Credentials::from_key_pair(key_pair))
    }
}
