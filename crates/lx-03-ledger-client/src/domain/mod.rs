//! # Domain Layer (Inner Hexagon)
//!
//! Pure encoding rules: ABI, transactions, wire types. No I/O.

pub mod abi;
pub mod transaction;
pub mod types;

pub use abi::{
    decode_address, encode_args, encode_call, function_signature, getter_signature, selector,
};
pub(crate) use abi::infer_arg;
pub use transaction::{LegacyTransaction, SignedTransaction};
pub use types::*;
