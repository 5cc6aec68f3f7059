//! # ABI Encoding
//!
//! Contract ABI encoding for the argument types a contract record can carry.
//!
//! ```text
//! encode_args([a0, a1, ...]) = head(a0) ‖ head(a1) ‖ ... ‖ tail(dynamic args)
//!
//! static  (address, uint256, bool)  head = 32-byte word
//! dynamic (string)                  head = offset of tail, tail = len ‖ padded bytes
//! ```

use crate::errors::LedgerError;
use serde_json::Value;
use shared_crypto::keccak256;
use shared_types::{strip_hex_prefix, Address, ConstructorArg, U256};

const WORD: usize = 32;

/// Four-byte function selector of a canonical signature such as
/// `transfer(address,uint256)`.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Canonical signature of `name` called with `args`.
#[must_use]
pub fn function_signature(name: &str, args: &[ConstructorArg]) -> String {
    let types: Vec<&str> = args.iter().map(ConstructorArg::abi_type).collect();
    format!("{name}({})", types.join(","))
}

/// Canonical signature of a zero-argument getter. Accepts `owner` or `owner()`.
#[must_use]
pub fn getter_signature(name: &str) -> String {
    let name = name.trim();
    if name.contains('(') {
        name.to_string()
    } else {
        format!("{name}()")
    }
}

fn uint_word(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn static_word(arg: &ConstructorArg) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    match arg {
        ConstructorArg::Address(address) => word[12..].copy_from_slice(address.as_bytes()),
        ConstructorArg::Uint(value) => word = uint_word(*value),
        ConstructorArg::Bool(flag) => word[WORD - 1] = u8::from(*flag),
        ConstructorArg::String(_) => {}
    }
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// ABI-encodes `args` as a tuple. Deterministic: equal input, equal output.
#[must_use]
pub fn encode_args(args: &[ConstructorArg]) -> Vec<u8> {
    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for arg in args {
        match arg {
            ConstructorArg::String(text) => {
                head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
                let bytes = text.as_bytes();
                tail.extend_from_slice(&uint_word(U256::from(bytes.len())));
                tail.extend_from_slice(bytes);
                tail.resize(tail.len() + padded_len(bytes.len()) - bytes.len(), 0);
            }
            static_arg => head.extend_from_slice(&static_word(static_arg)),
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Calldata for `name(args...)`: selector followed by the encoded arguments.
#[must_use]
pub fn encode_call(name: &str, args: &[ConstructorArg]) -> Vec<u8> {
    let mut data = selector(&function_signature(name, args)).to_vec();
    data.extend_from_slice(&encode_args(args));
    data
}

/// Decodes a single address-typed return value.
pub fn decode_address(data: &[u8]) -> Result<Address, LedgerError> {
    if data.len() < WORD {
        return Err(LedgerError::InvalidArtifact(format!(
            "expected a 32-byte address word, got {} bytes",
            data.len()
        )));
    }
    if data[..12].iter().any(|b| *b != 0) {
        return Err(LedgerError::InvalidArtifact(
            "return value is not an address".into(),
        ));
    }
    Address::from_slice(&data[12..WORD])
        .ok_or_else(|| LedgerError::InvalidArtifact("return value is not an address".into()))
}

/// Types an untyped argument by its shape. See
/// `LedgerApi::build_deployment_context_untyped`.
pub(crate) fn infer_arg(value: &Value) -> Result<ConstructorArg, LedgerError> {
    match value {
        Value::String(text) => infer_text_arg(text),
        Value::Number(number) => number
            .as_u64()
            .map(|n| ConstructorArg::Uint(U256::from(n)))
            .ok_or_else(|| LedgerError::InvalidArtifact(format!("unencodable number {number}"))),
        Value::Bool(flag) => Ok(ConstructorArg::Bool(*flag)),
        other => Err(LedgerError::InvalidArtifact(format!(
            "unencodable argument {other}"
        ))),
    }
}

fn infer_text_arg(text: &str) -> Result<ConstructorArg, LedgerError> {
    let digits = strip_hex_prefix(text);
    let has_prefix = digits.len() != text.len();
    if has_prefix && digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(ConstructorArg::Address(text.parse()?));
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return U256::from_dec_str(text)
            .map(ConstructorArg::Uint)
            .map_err(|_| LedgerError::InvalidArtifact(format!("integer out of range: {text}")));
    }
    Ok(ConstructorArg::String(text.to_string()))
}
