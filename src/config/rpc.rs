use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;

/// Resolved upstream endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Base JSON-RPC URL, absent when no Alchemy key is configured
    pub base_rpc_url: Option<String>,
    pub prices_url: Option<String>,
    pub dexscreener_base_url: String,
    pub neynar_base_url: String,
    pub timeout_seconds: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RpcConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let key = settings
            .providers
            .alchemy_api_key
            .as_deref()
            .filter(|k| !k.is_empty());

        Self {
            base_rpc_url: key.map(|k| format!("https://base-mainnet.g.alchemy.com/v2/{}", k)),
            prices_url: key.map(|k| {
                format!("https://api.g.alchemy.com/prices/v1/{}/tokens/by-address", k)
            }),
            dexscreener_base_url: settings.providers.dexscreener_base_url.clone(),
            neynar_base_url: settings.providers.neynar_base_url.clone(),
            timeout_seconds: 30,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_follow_key() {
        let mut settings = Settings::default();
        settings.providers.alchemy_api_key = None;
        assert!(RpcConfig::from_settings(&settings).base_rpc_url.is_none());

        settings.providers.alchemy_api_key = Some("abc".to_string());
        let config = RpcConfig::from_settings(&settings);
        assert_eq!(
            config.base_rpc_url.as_deref(),
            Some("https://base-mainnet.g.alchemy.com/v2/abc")
        );
        assert!(config.prices_url.unwrap().contains("/prices/v1/abc/"));
    }
}
