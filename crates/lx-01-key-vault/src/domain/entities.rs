//! # Vault Entities
//!
//! Wallet listings, decrypted credentials and the on-disk key file format.

use crate::errors::VaultError;
use serde::{Deserialize, Serialize};
use shared_crypto::{
    CryptoError, KdfParams, RecoverableSignature, SealedSecret, Secp256k1KeyPair,
};
use shared_types::{Address, U256};
use std::fmt;

// =============================================================================
// WALLET LISTING
// =============================================================================

/// Live balance of a wallet.
///
/// A failed lookup degrades to `Unavailable` instead of failing the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "wei", rename_all = "lowercase")]
pub enum Balance {
    /// Balance in the ledger's smallest unit.
    Known(U256),
    /// The ledger could not be asked.
    Unavailable,
}

/// A wallet as exposed to callers. The key file is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// User-chosen label (not unique).
    pub label: String,
    /// Address derived from the key material (unique within the store).
    pub address: Address,
    /// Balance fetched when the wallet was last scanned.
    pub balance: Balance,
}

/// A listed wallet together with the key file backing it.
#[derive(Debug, Clone)]
pub(crate) struct CachedWallet {
    pub info: WalletInfo,
    pub file_name: String,
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// A decrypted signing key and its address.
///
/// `Debug` never prints key material.
pub struct Credentials {
    address: Address,
    key_pair: Secp256k1KeyPair,
}

impl Credentials {
    /// Wraps a key pair.
    #[must_use]
    pub fn from_key_pair(key_pair: Secp256k1KeyPair) -> Self {
        Self {
            address: Address::new(key_pair.address()),
            key_pair,
        }
    }

    /// Ledger address of the signer.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte transaction hash.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        self.key_pair.sign_prehash(prehash)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// KEY FILE FORMAT
// =============================================================================

/// Current key file format version.
pub const KEY_FILE_VERSION: u32 = 1;

/// JSON document stored per wallet.
///
/// ```json
/// {
///   "version": 1,
///   "address": "0x...",
///   "label": "treasury",
///   "crypto": {
///     "kdf": "argon2id",
///     "kdfparams": { "m": 65536, "t": 3, "p": 4, "salt": "..." },
///     "cipher": "chacha20-poly1305",
///     "nonce": "...",
///     "ciphertext": "..."
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    /// Format version.
    pub version: u32,
    /// Address of the sealed key, readable without the passphrase.
    pub address: Address,
    /// Wallet label.
    pub label: String,
    /// Sealed secret.
    pub crypto: KeyFileCrypto,
}

/// Encryption section of a key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFileCrypto {
    /// Always `argon2id`.
    pub kdf: String,
    /// Argon2id parameters.
    pub kdfparams: KdfSection,
    /// Always `chacha20-poly1305`.
    pub cipher: String,
    /// Hex nonce.
    pub nonce: String,
    /// Hex ciphertext with tag.
    pub ciphertext: String,
}

/// Argon2id parameters as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfSection {
    /// Memory in KiB.
    pub m: u32,
    /// Iterations.
    pub t: u32,
    /// Lanes.
    pub p: u32,
    /// Hex salt.
    pub salt: String,
}

impl KeyFile {
    /// Builds a key file from a sealed secret.
    #[must_use]
    pub fn new(address: Address, label: &str, sealed: &SealedSecret) -> Self {
        Self {
            version: KEY_FILE_VERSION,
            address,
            label: label.to_string(),
            crypto: KeyFileCrypto {
                kdf: "argon2id".into(),
                kdfparams: KdfSection {
                    m: sealed.kdf.memory_kib,
                    t: sealed.kdf.iterations,
                    p: sealed.kdf.parallelism,
                    salt: hex::encode(sealed.salt),
                },
                cipher: "chacha20-poly1305".into(),
                nonce: hex::encode(sealed.nonce),
                ciphertext: hex::encode(&sealed.ciphertext),
            },
        }
    }

    /// Parses a key file document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, VaultError> {
        serde_json::from_slice(bytes)
            .map_err(|e| VaultError::WalletNotFound(format!("malformed key file: {e}")))
    }

    /// Serializes the key file document.
    pub fn to_json(&self) -> Result<Vec<u8>, VaultError> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| VaultError::WalletCreationFailed(format!("key file encoding: {e}")))
    }

    /// Recovers the sealed secret for decryption.
    pub fn sealed_secret(&self) -> Result<SealedSecret, VaultError> {
        let malformed = |field: &str| VaultError::WalletNotFound(format!("malformed key file {field}"));

        if self.crypto.kdf != "argon2id" || self.crypto.cipher != "chacha20-poly1305" {
            return Err(VaultError::WalletNotFound(format!(
                "unsupported key file scheme {}/{}",
                self.crypto.kdf, self.crypto.cipher
            )));
        }
        let salt: [u8; 16] = hex::decode(&self.crypto.kdfparams.salt)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| malformed("salt"))?;
        let nonce: [u8; 12] = hex::decode(&self.crypto.nonce)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| malformed("nonce"))?;
        let ciphertext = hex::decode(&self.crypto.ciphertext).map_err(|_| malformed("ciphertext"))?;

        Ok(SealedSecret {
            salt,
            nonce,
            ciphertext,
            kdf: KdfParams {
                memory_kib: self.crypto.kdfparams.m,
                iterations: self.crypto.kdfparams.t,
                parallelism: self.crypto.kdfparams.p,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::seal_secret;

    #[test]
    fn test_key_file_roundtrip() {
        let sealed = seal_secret(b"pw", &[9u8; 32], KdfParams::light()).unwrap();
        let file = KeyFile::new(Address::new([1; 20]), "ops", &sealed);

        let parsed = KeyFile::from_json(&file.to_json().unwrap()).unwrap();
        assert_eq!(parsed, file);
        assert_eq!(parsed.sealed_secret().unwrap(), sealed);
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let sealed = seal_secret(b"pw", &[9u8; 32], KdfParams::light()).unwrap();
        let mut file = KeyFile::new(Address::ZERO, "ops", &sealed);
        file.crypto.cipher = "aes-128-ctr".into();
        assert!(matches!(
            file.sealed_secret(),
            Err(VaultError::WalletNotFound(_))
        ));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let creds = Credentials::from_key_pair(Secp256k1KeyPair::from_bytes(secret).unwrap());
        let debug = format!("{creds:?}");
        assert!(debug.contains("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&hex::encode(secret)));
    }

    #[test]
    fn test_balance_serde() {
        let json = serde_json::to_string(&Balance::Unavailable).unwrap();
        assert_eq!(json, r#"{"state":"unavailable"}"#);
    }
}
