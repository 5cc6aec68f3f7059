//! Scripted in-memory transport.
//!
//! Answers from canned responses and records every request. Used by tests
//! across the workspace and for dry runs without a node.

use crate::errors::RpcError;
use crate::ports::RpcTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Method name.
    pub method: String,
    /// Parameters as sent.
    pub params: Value,
}

struct Rule {
    method: String,
    needle: String,
    response: Result<Value, RpcError>,
}

/// `RpcTransport` answering from a script.
///
/// Lookup order per request:
/// 1. one-shot responses queued with [`push`](Self::push), oldest first
/// 2. rules registered with [`respond_when`](Self::respond_when) whose needle
///    occurs in the serialized params, newest first
/// 3. the method's standing response from [`respond`](Self::respond) / [`fail`](Self::fail)
/// 4. a JSON-RPC "method not found" error
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Result<Value, RpcError>>>>,
    rules: Mutex<Vec<Rule>>,
    standing: Mutex<HashMap<String, Result<Value, RpcError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `method` call with `result`.
    pub fn respond(&self, method: &str, result: Value) -> &Self {
        self.standing.lock().insert(method.to_string(), Ok(result));
        self
    }

    /// Fail every `method` call with `error`.
    pub fn fail(&self, method: &str, error: RpcError) -> &Self {
        self.standing.lock().insert(method.to_string(), Err(error));
        self
    }

    /// Answer `method` calls whose params mention `needle` (case-insensitive).
    pub fn respond_when(
        &self,
        method: &str,
        needle: &str,
        response: Result<Value, RpcError>,
    ) -> &Self {
        self.rules.lock().push(Rule {
            method: method.to_string(),
            needle: needle.to_ascii_lowercase(),
            response,
        });
        self
    }

    /// Answer the next `method` call only.
    pub fn push(&self, method: &str, response: Result<Value, RpcError>) -> &Self {
        self.queued
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Every request seen so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of `method` requests seen so far.
    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, RpcError> {
        if let Some(response) = self
            .queued
            .lock()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        let haystack = params.to_string().to_ascii_lowercase();
        if let Some(rule) = self
            .rules
            .lock()
            .iter()
            .rev()
            .find(|r| r.method == method && haystack.contains(&r.needle))
        {
            return rule.response.clone();
        }

        self.standing
            .lock()
            .get(method)
            .cloned()
            .unwrap_or_else(|| {
                Err(RpcError::Rpc {
                    code: -32601,
                    message: format!("method {method} not scripted"),
                    data: None,
                })
            })
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let response = self.answer(method, &params);
        self.calls.lock().push(RecordedCall {
            method: method.to_string(),
            params,
        });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_lookup_order() {
        let transport = ScriptedTransport::new();
        transport
            .respond("eth_getCode", json!("0x"))
            .respond_when("eth_getCode", "0xAA", Ok(json!("0x6001")))
            .push("eth_getCode", Ok(json!("0x02")));

        assert_eq!(transport.request("eth_getCode", json!(["0xaa"])).await, Ok(json!("0x02")));
        assert_eq!(transport.request("eth_getCode", json!(["0xaa"])).await, Ok(json!("0x6001")));
        assert_eq!(transport.request("eth_getCode", json!(["0xbb"])).await, Ok(json!("0x")));
        assert_eq!(transport.calls_to("eth_getCode"), 3);
    }

    #[tokio::test]
    async fn test_unscripted_method() {
        let transport = ScriptedTransport::new();
        let err = transport.request("eth_foo", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Rpc { code: -32601, .. }));
        assert_eq!(transport.calls()[0].method, "eth_foo");
    }
}
