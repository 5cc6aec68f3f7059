//! JSON-RPC over HTTP.

use crate::domain::{JsonRpcRequest, JsonRpcResponse};
use crate::errors::RpcError;
use crate::ports::RpcTransport;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// `RpcTransport` posting JSON-RPC 2.0 requests to a node endpoint.
pub struct HttpRpcTransport {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl HttpRpcTransport {
    /// Create a transport for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this transport talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        trace!(method, id = request.id, "rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Transport(format!("cannot connect to {}", self.url))
                } else if e.is_timeout() {
                    RpcError::Transport(format!("{method} timed out"))
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("HTTP {status} from {}", self.url)));
        }

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }

        Ok(rpc_response.result.unwrap_or(Value::Null))
    }
}
