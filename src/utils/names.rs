use async_trait::async_trait;
use ethers::prelude::*;
use std::str::FromStr;
use tracing::error;

use crate::models::{GuardianError, Result};

/// Resolves `.eth` / `.base.eth` names to addresses
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>>;
}

/// Name resolution through an ethers provider on the Base RPC endpoint
pub struct EnsResolver {
    provider: Option<Provider<Http>>,
}

impl EnsResolver {
    pub fn new(rpc_url: Option<&str>) -> Result<Self> {
        let provider = match rpc_url {
            Some(url) => Some(
                Provider::<Http>::try_from(url)
                    .map_err(|e| GuardianError::ConfigError(format!("Invalid RPC URL: {}", e)))?,
            ),
            None => None,
        };

        Ok(Self { provider })
    }
}

#[async_trait]
impl NameResolver for EnsResolver {
    async fn resolve_name(&self, name: &str) -> Result<Option<Address>> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            GuardianError::ConfigError("ALCHEMY_BASE_API_KEY is not set".to_string())
        })?;

        match provider.resolve_name(name).await {
            Ok(address) => Ok(Some(address)),
            Err(ProviderError::EnsError(_)) | Err(ProviderError::EnsNotOwned(_)) => Ok(None),
            Err(e) => Err(GuardianError::NameResolution(format!("{}: {}", name, e))),
        }
    }
}

pub fn is_hex_address(input: &str) -> bool {
    input.starts_with("0x") && input.len() == 42 && Address::from_str(input).is_ok()
}

/// Accepts a 0x address or a `.base.eth` / `.eth` name and returns a
/// lowercase 0x address.
pub async fn resolve_address_or_name(resolver: &dyn NameResolver, input: &str) -> Result<String> {
    let trimmed = input.trim();

    if trimmed.starts_with("0x") && trimmed.len() == 42 {
        if !is_hex_address(trimmed) {
            return Err(GuardianError::InvalidAddress(trimmed.to_string()));
        }
        return Ok(trimmed.to_lowercase());
    }

    let lower = trimmed.to_lowercase();
    if lower.ends_with(".base.eth") || lower.ends_with(".eth") {
        return match resolver.resolve_name(&lower).await {
            Ok(Some(address)) => Ok(format!("{:?}", address)),
            Ok(None) => Err(GuardianError::NameResolution(lower)),
            Err(e) => {
                error!("Name resolution error for {}: {}", lower, e);
                Err(GuardianError::NameResolution(lower))
            }
        };
    }

    Err(GuardianError::InvalidAddress(
        "Input must be a 0x address or .base.eth name".to_string(),
    ))
}
