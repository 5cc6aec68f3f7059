//! # Keccak-256 Hashing
//!
//! The ledger's hash function: addresses, function selectors and
//! transaction hashes are all Keccak-256 digests.

use sha3::{Digest, Keccak256};

/// Keccak-256 output (256-bit).
pub type Hash = [u8; 32];

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}
