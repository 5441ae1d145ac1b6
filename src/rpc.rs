// JSON-RPC transport for the read provider and the wallet endpoint

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::ClientError;

/// A JSON-RPC 2.0 endpoint. Implemented over HTTP for real nodes and wallets.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Send one request and return its `result`. A `null` result is returned
    /// as `Value::Null`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

pub struct HttpTransport {
    http_client: HttpClient,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl JsonRpcTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        debug!("RPC {} -> {}", method, self.url);

        let resp = self
            .http_client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let rpc_resp: RpcResponse = resp.json().await?;

        if let Some(error) = rpc_resp.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_resp.result.unwrap_or(Value::Null))
    }
}

/// Decode a `0x`-prefixed hex data string returned by a node.
pub fn hex_data(value: &Value) -> Result<Vec<u8>, ClientError> {
    let s = value
        .as_str()
        .ok_or_else(|| ClientError::decode(format!("expected hex string, got {}", value)))?;
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| ClientError::decode(format!("invalid hex data: {}", e)))
}
