//! # Ledger Types
//!
//! JSON-RPC envelopes, call objects and receipts as exchanged with the node,
//! plus the results the ledger client hands back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{format_quantity, Address, Bytes, TxHash, U256};

// =============================================================================
// JSON-RPC ENVELOPES
// =============================================================================

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Positional parameters.
    pub params: Value,
    /// Request id.
    pub id: u64,
}

impl JsonRpcRequest {
    /// Builds a request.
    pub fn new(method: &str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Result on success. A `null` result is a valid answer.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error object on failure.
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    /// Echoed request id.
    #[serde(default)]
    pub id: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Message.
    pub message: String,
    /// Optional detail, e.g. revert data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// =============================================================================
// CALL OBJECTS
// =============================================================================

/// Parameters of a call, a gas estimate or a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallParams {
    /// Sender.
    pub from: Option<Address>,
    /// Sender nonce, if already known.
    pub nonce: Option<u64>,
    /// Recipient; `None` for contract creation.
    pub to: Option<Address>,
    /// Value in the smallest unit.
    pub value: U256,
    /// Calldata or creation code.
    pub data: Bytes,
}

/// `eth_call` / `eth_estimateGas` call object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallObject {
    /// Sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Sender nonce as a quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Value as a quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Hex calldata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

impl From<&CallParams> for CallObject {
    fn from(params: &CallParams) -> Self {
        Self {
            from: params.from,
            to: params.to,
            nonce: params.nonce.map(|n| format_quantity(U256::from(n))),
            value: (!params.value.is_zero()).then(|| format_quantity(params.value)),
            data: (!params.data.is_empty()).then(|| params.data.clone()),
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Gas price and limit for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasQuote {
    /// Current price per unit of gas.
    pub gas_price: U256,
    /// Simulated gas with the safety margin applied.
    pub gas_limit: U256,
}

/// Transaction receipt as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Hash of the included transaction.
    pub transaction_hash: TxHash,
    /// Block number as a quantity.
    #[serde(default)]
    pub block_number: Option<String>,
    /// Address of the created contract, for creations.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// `0x1` on success, `0x0` on failure.
    #[serde(default)]
    pub status: Option<String>,
    /// Gas used as a quantity.
    #[serde(default)]
    pub gas_used: Option<String>,
}

impl TransactionReceipt {
    /// False only when the node reports an explicit failure status.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x"))
    }
}

/// A confirmed contract creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Address of the new contract.
    pub address: Address,
    /// Creation transaction.
    pub tx_hash: TxHash,
    /// Gas price and limit the transaction was sent with.
    pub gas: GasQuote,
}

/// Outcome of one getter in a batch address lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressResolution {
    /// The getter returned an address.
    Resolved(Address),
    /// The getter failed; carries the error text.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_object_omits_empty_fields() {
        let params = CallParams {
            from: Some("0x0000000000000000000000000000000000000001".parse().unwrap()),
            data: Bytes::from(vec![0x60]),
            ..CallParams::default()
        };
        let value = serde_json::to_value(CallObject::from(&params)).unwrap();
        assert_eq!(
            value,
            json!({"from": "0x0000000000000000000000000000000000000001", "data": "0x60"})
        );
    }

    #[test]
    fn test_receipt_parses_node_shape() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "ab".repeat(32)),
            "blockNumber": "0x10",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "status": "0x1",
            "gasUsed": "0x5208",
            "logs": []
        }))
        .unwrap();
        assert!(receipt.succeeded());
        assert!(receipt.contract_address.is_some());

        let failed = TransactionReceipt {
            status: Some("0x0".into()),
            ..receipt
        };
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_null_contract_address() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": format!("0x{}", "cd".repeat(32)),
            "contractAddress": null,
            "status": "0x1"
        }))
        .unwrap();
        assert_eq!(receipt.contract_address, None);
    }

    #[test]
    fn test_resolution_serializes_flat() {
        assert_eq!(
            serde_json::to_value(AddressResolution::Failed("execution reverted".into())).unwrap(),
            json!("execution reverted")
        );
    }
}
