//! # Shared Crypto - Signing Keys and Key Files
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Transaction signing, address derivation |
//! | `hashing` | Keccak-256 | Addresses, selectors, transaction hashes |
//! | `symmetric` | Argon2id + ChaCha20-Poly1305 | Passphrase-sealed key files |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization (EIP-2)
//! - **Argon2id**: memory-hard passphrase stretching
//! - **ChaCha20-Poly1305**: authenticated, tampering is detected on open
//! - Secret bytes are zeroized when dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use ecdsa::{RecoverableSignature, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::keccak256;
pub use symmetric::{open_secret, seal_secret, KdfParams, SealedSecret};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
