//! # Passphrase-Sealed Secrets
//!
//! Key files hold the 32-byte wallet secret encrypted under a key stretched
//! from the keystore passphrase.
//!
//! ```text
//! passphrase ──Argon2id(salt, params)──→ KEK ──ChaCha20-Poly1305(nonce)──→ ciphertext
//! ```
//!
//! Salt, nonce and the Argon2 parameters travel with the ciphertext so a
//! file can be opened after the defaults change.

use crate::CryptoError;
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

/// Salt length for key derivation (16 bytes)
pub const SALT_LEN: usize = 16;

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_LEN: usize = 12;

/// Sealed secret length (32 bytes)
pub const SECRET_LEN: usize = 32;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Iteration count.
    pub iterations: u32,
    /// Lanes.
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Minimal cost, for throwaway keystores in tests and local development.
    pub fn light() -> Self {
        Self {
            memory_kib: 1_024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// A secret encrypted under a passphrase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedSecret {
    /// Argon2id salt.
    pub salt: [u8; SALT_LEN],
    /// AEAD nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext plus 16-byte tag.
    pub ciphertext: Vec<u8>,
    /// Parameters used to stretch the passphrase.
    pub kdf: KdfParams,
}

fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    kdf: KdfParams,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let params = Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(32))
        .map_err(|e| CryptoError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;
    Ok(key)
}

/// Encrypt `secret` under `passphrase` with a fresh salt and nonce.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivationFailed` for unusable parameters and
/// `CryptoError::EncryptionFailed` if the AEAD rejects the input.
pub fn seal_secret(
    passphrase: &[u8],
    secret: &[u8; SECRET_LEN],
    kdf: KdfParams,
) -> Result<SealedSecret, CryptoError> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt, kdf)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), secret.as_slice())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(SealedSecret {
        salt,
        nonce,
        ciphertext,
        kdf,
    })
}

/// Decrypt a sealed secret.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` on a wrong passphrase or a
/// tampered file, and `CryptoError::InvalidKeyLength` if the plaintext is
/// not a 32-byte secret.
pub fn open_secret(
    passphrase: &[u8],
    sealed: &SealedSecret,
) -> Result<Zeroizing<[u8; SECRET_LEN]>, CryptoError> {
    let key = derive_key(passphrase, &sealed.salt, sealed.kdf)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
    let mut plaintext = cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed("wrong passphrase or corrupted key file".into()))?;

    if plaintext.len() != SECRET_LEN {
        let actual = plaintext.len();
        plaintext.zeroize();
        return Err(CryptoError::InvalidKeyLength {
            expected: SECRET_LEN,
            actual,
        });
    }

    let mut secret = Zeroizing::new([0u8; SECRET_LEN]);
    secret.copy_from_slice(&plaintext);
    plaintext.zeroize();
    Ok(secret)
}
