use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{GuardianError, Result};

/// A JSON-RPC endpoint. `call` returns the `result` member, which may be null.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

/// Decode an RPC result into `T`, treating a null result as absent
pub fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| GuardianError::MalformedResponse(format!("{}: {}", method, e)))
}

/// Configuration for chain clients
#[derive(Debug, Clone)]
pub struct ChainClientConfig {
    pub rpc_url: Option<String>,
    pub timeout_seconds: u64,
}
