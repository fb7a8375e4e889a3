use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardianError {
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("Failed to resolve name: {0}")]
    NameResolution(String),

    #[error("RPC error on {method}: {message}")]
    RpcError { method: String, message: String },

    #[error("{service} request failed: {message}")]
    UpstreamError { service: String, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl GuardianError {
    pub fn rpc(method: &str, message: impl Into<String>) -> Self {
        GuardianError::RpcError {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn upstream(service: &str, message: impl Into<String>) -> Self {
        GuardianError::UpstreamError {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardianError>;
