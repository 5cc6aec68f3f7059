//! # Outbound Ports (Driven Ports)

use crate::errors::RpcError;
use async_trait::async_trait;
use serde_json::Value;

/// One JSON-RPC round trip to the ledger node.
///
/// Production: `HttpRpcTransport`
/// Testing: `ScriptedTransport`
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Calls `method` with positional `params` and returns the `result`
    /// member (`Value::Null` when the node answers `null`).
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}
