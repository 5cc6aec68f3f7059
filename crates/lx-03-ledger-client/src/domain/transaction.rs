//! # Legacy Transactions
//!
//! EIP-155 replay-protected legacy transactions, RLP-encoded.
//!
//! ```text
//! signing hash = keccak256(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))
//! raw          = rlp([nonce, gasPrice, gas, to, value, data, v, r, s])
//! v            = recovery_id + chainId * 2 + 35
//! ```
//!
//! A contract creation leaves `to` empty.

use crate::errors::LedgerError;
use lx_01_key_vault::Credentials;
use rlp::RlpStream;
use shared_crypto::{keccak256, RecoverableSignature};
use shared_types::{Address, Bytes, TxHash, U256};

/// An unsigned legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    /// Sender account nonce.
    pub nonce: u64,
    /// Price per unit of gas.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: U256,
    /// Recipient; `None` creates a contract.
    pub to: Option<Address>,
    /// Value transferred in the smallest unit.
    pub value: U256,
    /// Calldata or creation code.
    pub data: Vec<u8>,
    /// Chain the signature is bound to.
    pub chain_id: u64,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP encoding of the signed transaction.
    pub raw: Bytes,
    /// Keccak-256 of `raw`.
    pub hash: TxHash,
}

impl LegacyTransaction {
    fn append_body(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => stream.append(&to.as_bytes().to_vec()),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// The hash the sender signs.
    #[must_use]
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(&stream.out())
    }

    /// Encodes the transaction with `signature` attached.
    #[must_use]
    pub fn encode_signed(&self, signature: &RecoverableSignature) -> SignedTransaction {
        let v = u64::from(signature.recovery_id) + self.chain_id * 2 + 35;

        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&v);
        stream.append(&U256::from_big_endian(&signature.r));
        stream.append(&U256::from_big_endian(&signature.s));

        let raw = stream.out().to_vec();
        SignedTransaction {
            hash: TxHash::new(keccak256(&raw)),
            raw: Bytes::from(raw),
        }
    }

    /// Signs with `signer`'s key.
    pub fn sign(&self, signer: &Credentials) -> Result<SignedTransaction, LedgerError> {
        let signature = signer
            .sign_prehash(&self.signing_hash())
            .map_err(|e| LedgerError::DeploymentFailed(format!("signing failed: {e}")))?;
        Ok(self.encode_signed(&signature))
    }
}
