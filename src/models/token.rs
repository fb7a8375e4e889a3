use serde::{Deserialize, Serialize};

use crate::models::Health;

/// Entry of `alchemy_getTokenBalances`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceItem {
    pub contract_address: String,
    #[serde(default)]
    pub token_balance: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesResult {
    pub address: Option<String>,
    #[serde(default)]
    pub token_balances: Vec<TokenBalanceItem>,
}

/// Result of `alchemy_getTokenMetadata`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u32>,
    pub logo: Option<String>,
}

/// One holding in a wallet's token portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub contract_address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub decimals: Option<u32>,
    pub raw_balance: String,
    /// Human-readable balance label
    pub balance: String,
    pub price_usd: Option<f64>,
    pub value_usd: Option<f64>,
    pub health: Health,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPortfolio {
    pub address: String,
    pub chain: String,
    pub tokens: Vec<TokenSummary>,
}

/// Market view of a single token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleTokenInfo {
    pub contract_address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub decimals: Option<u32>,
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub fdv_usd: Option<f64>,
    pub market_cap_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub pair_url: Option<String>,
    pub pair_created_at: Option<i64>,
    pub health: Health,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairToken {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairLiquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairVolume {
    pub h24: Option<f64>,
}

/// Trading pair as returned by DexScreener
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub pair_address: Option<String>,
    pub base_token: Option<PairToken>,
    pub quote_token: Option<PairToken>,
    pub price_usd: Option<String>,
    pub liquidity: Option<PairLiquidity>,
    pub volume: Option<PairVolume>,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    pub pair_created_at: Option<i64>,
}

impl DexPair {
    pub fn liquidity_usd(&self) -> Option<f64> {
        self.liquidity.as_ref().and_then(|l| l.usd)
    }

    pub fn volume_24h_usd(&self) -> Option<f64> {
        self.volume.as_ref().and_then(|v| v.h24)
    }

    pub fn price(&self) -> Option<f64> {
        self.price_usd
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .filter(|p| p.is_finite())
    }
}
