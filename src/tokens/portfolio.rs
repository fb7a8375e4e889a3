use ethers::types::U256;
use futures::future::try_join_all;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    chains::{client::decode_result, gas::u256_to_f64, RpcTransport},
    models::{Result, TokenBalanceItem, TokenBalancesResult, TokenMetadata, TokenSummary},
    scoring::score_portfolio_token,
    tokens::prices::PriceSource,
    utils::round_dp,
};

const BALANCES: &str = "alchemy_getTokenBalances";
const METADATA: &str = "alchemy_getTokenMetadata";

/// Positive raw balance, `None` for empty, zero or unparsable values
pub fn parse_raw_balance(raw: Option<&str>) -> Option<U256> {
    let raw = raw?.trim();
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    U256::from_str_radix(digits, 16).ok().filter(|v| !v.is_zero())
}

/// Numeric balance plus its display label
pub fn format_balance(raw: U256, decimals: Option<u32>) -> (Option<f64>, String) {
    // out-of-range decimals from a token contract are treated as unknown
    let Some(decimals) = decimals.and_then(|d| i32::try_from(d).ok()) else {
        return (None, "0".to_string());
    };

    let numeric = u256_to_f64(raw) / 10f64.powi(decimals);
    if !numeric.is_finite() {
        return (None, "0".to_string());
    }

    let label = if numeric == 0.0 {
        "0".to_string()
    } else if numeric >= 1.0 {
        format!("{:.4}", numeric)
    } else if numeric >= 0.0001 {
        format!("{:.6}", numeric)
    } else {
        "< 0.0001".to_string()
    };

    (Some(numeric), label)
}

/// Builds a wallet's ERC-20 portfolio with prices and health hints
pub struct PortfolioScanner {
    rpc: Arc<dyn RpcTransport>,
    prices: Arc<dyn PriceSource>,
    limit: usize,
}

impl PortfolioScanner {
    pub fn new(rpc: Arc<dyn RpcTransport>, prices: Arc<dyn PriceSource>, limit: usize) -> Self {
        Self { rpc, prices, limit }
    }

    async fn fetch_balances(&self, address: &str) -> Result<Vec<TokenBalanceItem>> {
        let raw = self.rpc.call(BALANCES, json!([address, "erc20"])).await?;
        let result: TokenBalancesResult = decode_result(BALANCES, raw)?.unwrap_or_default();
        Ok(result.token_balances)
    }

    async fn fetch_metadata(&self, contract: &str) -> Result<Option<TokenMetadata>> {
        let raw = self.rpc.call(METADATA, json!([contract])).await?;
        decode_result(METADATA, raw)
    }

    /// Largest holdings by raw balance, capped at the portfolio limit
    fn top_holdings(&self, balances: Vec<TokenBalanceItem>) -> Vec<(TokenBalanceItem, U256)> {
        let mut held: Vec<(TokenBalanceItem, U256)> = balances
            .into_iter()
            .filter(|b| b.error.is_none())
            .filter_map(|b| {
                let amount = parse_raw_balance(b.token_balance.as_deref())?;
                Some((b, amount))
            })
            .collect();

        held.sort_by(|a, b| b.1.cmp(&a.1));
        held.truncate(self.limit);
        held
    }

    pub async fn scan(&self, address: &str) -> Result<Vec<TokenSummary>> {
        let held = self.top_holdings(self.fetch_balances(address).await?);
        if held.is_empty() {
            return Ok(Vec::new());
        }

        let metadata = try_join_all(
            held.iter()
                .map(|(b, _)| self.fetch_metadata(&b.contract_address)),
        )
        .await?;

        let contracts: Vec<String> = held.iter().map(|(b, _)| b.contract_address.clone()).collect();
        let prices = self.prices.usd_prices(&contracts).await;

        let mut tokens = Vec::with_capacity(held.len());
        for ((balance, amount), meta) in held.into_iter().zip(metadata) {
            let meta = meta.unwrap_or_default();
            let (numeric, label) = format_balance(amount, meta.decimals);

            let Some(numeric) = numeric.filter(|n| *n != 0.0) else {
                continue;
            };

            let price_usd = prices.get(&balance.contract_address.to_lowercase()).copied();
            let value_usd = price_usd.map(|p| numeric * p);
            let assessment = score_portfolio_token(meta.symbol.as_deref(), value_usd);

            tokens.push(TokenSummary {
                contract_address: balance.contract_address,
                symbol: meta.symbol,
                name: meta.name,
                logo: meta.logo,
                decimals: meta.decimals,
                raw_balance: balance.token_balance.unwrap_or_default(),
                balance: label,
                price_usd,
                value_usd: value_usd.map(|v| round_dp(v, 2)),
                health: assessment.health,
                reasons: assessment.reasons,
            });
        }

        tokens.sort_by(|a, b| {
            b.value_usd
                .unwrap_or(0.0)
                .total_cmp(&a.value_usd.unwrap_or(0.0))
        });

        info!("Scanned {} tokens for {}", tokens.len(), address);
        debug!("{} tokens priced", tokens.iter().filter(|t| t.price_usd.is_some()).count());
        Ok(tokens)
    }
}
