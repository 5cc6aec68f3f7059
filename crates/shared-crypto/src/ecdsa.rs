//! # ECDSA Signing (secp256k1)
//!
//! Wallet keys for the ledger.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2), with the recovery id adjusted to match
//! - The signing key zeroizes itself on drop
//!
//! ## Address Derivation
//!
//! `address = keccak256(uncompressed_pubkey[1..])[12..]`

use crate::hashing::keccak256;
use crate::CryptoError;
use k256::ecdsa::{SigningKey, VerifyingKey};
use std::fmt;

/// A recoverable ECDSA signature over a 32-byte prehash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// R scalar, big-endian.
    pub r: [u8; 32],
    /// S scalar, big-endian, always in the lower half of the curve order.
    pub s: [u8; 32],
    /// Recovery id (0 or 1).
    pub recovery_id: u8,
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a secret key slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Self::from_bytes(array)
    }

    /// Ledger address derived from the public key.
    pub fn address(&self) -> [u8; 20] {
        address_from_pubkey(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte message hash, returning a recoverable signature.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let (r, s) = signature.split_bytes();
        Ok(RecoverableSignature {
            r: r.into(),
            s: s.into(),
            recovery_id: recovery_id.to_byte(),
        })
    }

    /// Get secret key bytes (for sealing into a key file).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &format_args!("{:02x?}", self.address()))
            .finish_non_exhaustive()
    }
}

/// Derive the ledger address from a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> [u8; 20] {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature};

    #[test]
    fn test_known_address() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let keypair = Secp256k1KeyPair::from_bytes(secret).unwrap();
        assert_eq!(
            hex::encode(keypair.address()),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_signature_recovers_signer() {
        let keypair = Secp256k1KeyPair::generate();
        let prehash = keccak256(b"deploy");

        let sig = keypair.sign_prehash(&prehash).unwrap();
        let signature = Signature::from_scalars(sig.r, sig.s).unwrap();
        let recovery_id = RecoveryId::from_byte(sig.recovery_id).unwrap();
        let recovered = VerifyingKey::recover_from_prehash(&prehash, &signature, recovery_id).unwrap();

        assert_eq!(address_from_pubkey(&recovered), keypair.address());
        assert!(sig.recovery_id <= 1);
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = Secp256k1KeyPair::from_bytes([0xABu8; 32]).unwrap();
        let prehash = keccak256(b"deterministic test");

        let sig1 = keypair.sign_prehash(&prehash).unwrap();
        let sig2 = keypair.sign_prehash(&prehash).unwrap();

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_roundtrip_bytes() {
        let original = Secp256k1KeyPair::generate();
        let restored = Secp256k1KeyPair::from_slice(&original.to_bytes()).unwrap();

        assert_eq!(original.address(), restored.address());
        assert!(Secp256k1KeyPair::from_slice(&[1u8; 31]).is_err());
        assert!(Secp256k1KeyPair::from_bytes([0u8; 32]).is_err());
    }
}
