use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::{
    chains::client::{ChainClientConfig, RpcTransport},
    models::{GuardianError, Result},
};

/// Base mainnet JSON-RPC client backed by Alchemy
pub struct AlchemyRpcClient {
    http_client: reqwest::Client,
    rpc_url: Option<String>,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl AlchemyRpcClient {
    pub fn new(config: ChainClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GuardianError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            rpc_url: config.rpc_url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.rpc_url.is_some()
    }
}

/// Turn a raw HTTP exchange into the `result` member or an error
fn parse_rpc_body(method: &str, status: u16, ok: bool, text: &str) -> Result<Value> {
    let response: RpcResponse = serde_json::from_str(text).map_err(|_| {
        GuardianError::rpc(
            method,
            format!(
                "Alchemy RPC returned non-JSON (status {}): {}",
                status,
                truncate(text, 200)
            ),
        )
    })?;

    if let Some(error) = response.error {
        let message = error.message.unwrap_or_else(|| "unknown error".to_string());
        let code = error.code.map(|c| format!("{} ", c)).unwrap_or_default();
        return Err(GuardianError::rpc(
            method,
            format!("Alchemy RPC error (status {}): {}{}", status, code, message),
        ));
    }

    if !ok {
        return Err(GuardianError::rpc(
            method,
            format!("Alchemy RPC error (status {}): {}", status, truncate(text, 200)),
        ));
    }

    Ok(response.result)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[async_trait]
impl RpcTransport for AlchemyRpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let url = self.rpc_url.as_deref().ok_or_else(|| {
            GuardianError::ConfigError("ALCHEMY_BASE_API_KEY is not configured".to_string())
        })?;

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!("RPC {} (id {})", method, request.id);

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GuardianError::rpc(method, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GuardianError::rpc(method, format!("Failed to read response: {}", e)))?;

        parse_rpc_body(method, status.as_u16(), status.is_success(), &text)
    }
}
