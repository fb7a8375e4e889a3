use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    chains::{client::decode_result, RpcTransport},
    models::{Result, SingleTokenInfo, TokenMetadata},
    scoring::{score_market, MarketInput},
    tokens::dexscreener::{pick_best_pair, MarketDataSource},
};

const METADATA: &str = "alchemy_getTokenMetadata";

/// Market view of one token: best DEX pair plus Alchemy metadata
pub struct TokenInfoService {
    rpc: Arc<dyn RpcTransport>,
    market: Arc<dyn MarketDataSource>,
}

impl TokenInfoService {
    pub fn new(rpc: Arc<dyn RpcTransport>, market: Arc<dyn MarketDataSource>) -> Self {
        Self { rpc, market }
    }

    async fn fetch_metadata(&self, contract: &str) -> Result<Option<TokenMetadata>> {
        let raw = self.rpc.call(METADATA, json!([contract])).await?;
        decode_result(METADATA, raw)
    }

    pub async fn lookup(&self, contract: &str) -> Option<SingleTokenInfo> {
        self.lookup_at(contract, Utc::now().timestamp_millis()).await
    }

    /// `None` when neither a pair nor a name or symbol could be found
    pub async fn lookup_at(&self, contract: &str, now_ms: i64) -> Option<SingleTokenInfo> {
        let pairs = self.market.base_pairs(contract).await;
        let best = pick_best_pair(&pairs);

        let base_token = best.and_then(|p| p.base_token.as_ref());
        let mut symbol = base_token.and_then(|t| t.symbol.clone());
        let mut name = base_token.and_then(|t| t.name.clone());
        let mut logo = None;
        let mut decimals = None;

        match self.fetch_metadata(contract).await {
            Ok(Some(meta)) => {
                symbol = symbol.or(meta.symbol);
                name = name.or(meta.name);
                logo = meta.logo;
                decimals = meta.decimals;
            }
            Ok(None) => {}
            Err(e) => warn!("Token metadata unavailable for {}: {}", contract, e),
        }

        if best.is_none() && symbol.is_none() && name.is_none() {
            info!("No market data or metadata for {}", contract);
            return None;
        }

        let market = MarketInput::from_pair(best, symbol.clone(), now_ms);
        let assessment = score_market(&market);

        Some(SingleTokenInfo {
            contract_address: contract.to_string(),
            symbol,
            name,
            logo,
            decimals,
            price_usd: market.price_usd,
            liquidity_usd: market.liquidity_usd,
            fdv_usd: market.fdv_usd,
            market_cap_usd: market.market_cap_usd,
            volume_24h_usd: market.volume_24h_usd,
            pair_url: best.and_then(|p| p.url.clone()),
            pair_created_at: best.and_then(|p| p.pair_created_at),
            health: assessment.health,
            reasons: assessment.reasons,
        })
    }
}
