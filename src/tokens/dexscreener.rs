use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{DexPair, GuardianError, Result};

const SERVICE: &str = "DexScreener";

/// DEX market data for Base tokens
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Base pairs for a token; unavailable data yields an empty list.
    async fn base_pairs(&self, contract: &str) -> Vec<DexPair>;
}

pub struct DexScreenerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_pairs(&self, contract: &str) -> Result<Vec<DexPair>> {
        let url = format!("{}/base/{}", self.base_url, contract);
        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardianError::upstream(SERVICE, format!("status {}", status)));
        }

        let body: Value = response.json().await?;
        parse_base_pairs(body)
    }
}

/// Pairs on a Base chain id from a DexScreener token response
pub fn parse_base_pairs(body: Value) -> Result<Vec<DexPair>> {
    let Value::Array(items) = body else {
        return Err(GuardianError::MalformedResponse(
            "DexScreener response is not an array".to_string(),
        ));
    };

    let pairs = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<DexPair>(item).ok())
        .filter(|p| {
            p.chain_id
                .as_deref()
                .map_or(false, |c| c.to_lowercase().contains("base"))
        })
        .collect();

    Ok(pairs)
}

/// Pair with the deepest USD liquidity; the earliest wins ties
pub fn pick_best_pair(pairs: &[DexPair]) -> Option<&DexPair> {
    let mut best: Option<&DexPair> = None;
    for pair in pairs {
        let liquidity = pair.liquidity_usd().unwrap_or(0.0);
        if best.map_or(true, |b| liquidity > b.liquidity_usd().unwrap_or(0.0)) {
            best = Some(pair);
        }
    }
    best
}

#[async_trait]
impl MarketDataSource for DexScreenerClient {
    async fn base_pairs(&self, contract: &str) -> Vec<DexPair> {
        match self.fetch_pairs(contract).await {
            Ok(pairs) => {
                debug!("{} Base pairs for {}", pairs.len(), contract);
                pairs
            }
            Err(e) => {
                warn!("DexScreener lookup failed for {}: {}", contract, e);
                Vec::new()
            }
        }
    }
}
