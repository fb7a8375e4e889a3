use crate::models::{Assessment, DexPair};
use crate::scoring::rules::{HealthBands, Rule, RuleSet};

const STABLECOINS: [&str; 4] = ["USDC", "USDBC", "USDT", "DAI"];
const ETH_LIKE: [&str; 2] = ["WETH", "CBETH"];

const MS_PER_DAY: f64 = 86_400_000.0;

type PortfolioRule = Rule<PortfolioInput>;
type MarketRule = Rule<MarketInput>;

pub fn is_stable_symbol(symbol: Option<&str>) -> bool {
    symbol.map_or(false, |s| STABLECOINS.contains(&s.to_uppercase().as_str()))
}

fn is_eth_like_symbol(symbol: Option<&str>) -> bool {
    symbol.map_or(false, |s| ETH_LIKE.contains(&s.to_uppercase().as_str()))
}

/// A wallet holding: symbol plus its USD value, when priced
#[derive(Debug, Clone, Default)]
pub struct PortfolioInput {
    pub symbol: Option<String>,
    pub value_usd: Option<f64>,
}

impl PortfolioInput {
    fn is_stable(&self) -> bool {
        is_stable_symbol(self.symbol.as_deref())
    }

    fn is_eth_like(&self) -> bool {
        is_eth_like_symbol(self.symbol.as_deref())
    }

    fn has_value(&self) -> bool {
        self.value_usd.map_or(false, |v| v > 0.0)
    }
}

pub fn portfolio_rules() -> RuleSet<PortfolioInput> {
    RuleSet {
        base: 0,
        rules: vec![
            PortfolioRule::note("Looks like a stablecoin on Base.", |t| t.is_stable()),
            PortfolioRule::note("ETH-like wrapped asset.", |t| t.is_eth_like()),
            PortfolioRule::new("Tracked price and sizeable position.", 2, |t| {
                t.value_usd.map_or(false, |v| v >= 100.0)
            }),
            PortfolioRule::new("Tracked price but smaller position.", 1, |t| {
                t.value_usd.map_or(false, |v| v > 0.0 && v < 100.0)
            }),
            PortfolioRule::new(
                "Treating as a major stablecoin even though onchain price feed is missing.",
                1,
                |t| t.is_stable() && !t.has_value(),
            ),
            PortfolioRule::note("No price data; may be low-liquidity or off main listings.", |t| {
                !t.is_stable() && !t.has_value()
            }),
        ],
        clamp: None,
        bands: HealthBands {
            good_at_or_above: 2,
            risky_at_or_below: 0,
        },
    }
}

pub fn score_portfolio_token(symbol: Option<&str>, value_usd: Option<f64>) -> Assessment {
    portfolio_rules().evaluate(&PortfolioInput {
        symbol: symbol.map(String::from),
        value_usd,
    })
}

/// Market data of a token's best trading pair
#[derive(Debug, Clone, Default)]
pub struct MarketInput {
    pub symbol: Option<String>,
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub volume_24h_usd: Option<f64>,
    pub fdv_usd: Option<f64>,
    pub market_cap_usd: Option<f64>,
    pub pool_age_days: Option<f64>,
}

impl MarketInput {
    /// Build from a pair, with pool age measured against `now_ms`
    pub fn from_pair(pair: Option<&DexPair>, symbol: Option<String>, now_ms: i64) -> Self {
        let Some(pair) = pair else {
            return Self {
                symbol,
                ..Self::default()
            };
        };

        Self {
            symbol,
            price_usd: pair.price(),
            liquidity_usd: pair.liquidity_usd(),
            volume_24h_usd: pair.volume_24h_usd(),
            fdv_usd: pair.fdv,
            market_cap_usd: pair.market_cap,
            pool_age_days: pool_age_days(pair.pair_created_at, now_ms),
        }
    }

    fn fdv_to_liquidity(&self) -> Option<f64> {
        match (self.fdv_usd, self.liquidity_usd) {
            (Some(fdv), Some(liq)) if liq > 0.0 => Some(fdv / liq),
            _ => None,
        }
    }

    fn size(&self) -> Option<f64> {
        self.market_cap_usd.or(self.fdv_usd)
    }
}

pub fn pool_age_days(created_at_ms: Option<i64>, now_ms: i64) -> Option<f64> {
    created_at_ms
        .filter(|ms| *ms > 0)
        .map(|ms| (now_ms - ms) as f64 / MS_PER_DAY)
}

pub fn market_rules() -> RuleSet<MarketInput> {
    RuleSet {
        base: 65,
        rules: vec![
            MarketRule::new("Looks like a major stablecoin on Base.", 5, |m| {
                is_stable_symbol(m.symbol.as_deref())
            }),
            // liquidity
            MarketRule::new("No DEX liquidity data; treated as illiquid.", -20, |m| {
                m.liquidity_usd.is_none()
            }),
            MarketRule::new("Very low liquidity (< $5k); hard to enter/exit safely.", -25, |m| {
                m.liquidity_usd.map_or(false, |l| l < 5_000.0)
            }),
            MarketRule::new("Moderate liquidity; fine for small position sizes.", -5, |m| {
                m.liquidity_usd.map_or(false, |l| (5_000.0..50_000.0).contains(&l))
            }),
            MarketRule::new("Strong liquidity; easier to trade in size.", 10, |m| {
                m.liquidity_usd.map_or(false, |l| l >= 50_000.0)
            }),
            // 24h volume
            MarketRule::new("Low 24h volume; limited recent trading activity.", -10, |m| {
                m.volume_24h_usd.map_or(false, |v| v < 5_000.0)
            }),
            MarketRule::note("Healthy but not huge 24h volume.", |m| {
                m.volume_24h_usd.map_or(false, |v| (5_000.0..50_000.0).contains(&v))
            }),
            MarketRule::new("High 24h volume; actively traded.", 5, |m| {
                m.volume_24h_usd.map_or(false, |v| v >= 50_000.0)
            }),
            // valuation vs depth
            MarketRule::new(
                "FDV is extremely high vs liquidity; could be heavily overvalued or concentrated.",
                -15,
                |m| m.fdv_to_liquidity().map_or(false, |r| r > 1000.0),
            ),
            MarketRule::new("FDV significantly higher than liquidity; be cautious.", -5, |m| {
                m.fdv_to_liquidity().map_or(false, |r| r > 200.0 && r <= 1000.0)
            }),
            MarketRule::new("Smaller-cap token; more volatile and higher risk.", -5, |m| {
                m.size().map_or(false, |s| s < 1_000_000.0)
            }),
            MarketRule::new("Larger-cap token; generally more mature.", 5, |m| {
                m.size().map_or(false, |s| s > 10_000_000.0)
            }),
            // pool age
            MarketRule::new("Very new pool (< 3 days); high launch risk.", -15, |m| {
                m.pool_age_days.map_or(false, |d| d < 3.0)
            }),
            MarketRule::new("Newish pool (< 2 weeks); still early.", -5, |m| {
                m.pool_age_days.map_or(false, |d| (3.0..14.0).contains(&d))
            }),
            MarketRule::new("Pool has been live for a while; not a fresh launch.", 5, |m| {
                m.pool_age_days.map_or(false, |d| d >= 14.0)
            }),
            MarketRule::new("No reliable USD price; may be off major listings.", -10, |m| {
                m.price_usd.is_none()
            }),
        ],
        clamp: Some((0, 100)),
        bands: HealthBands {
            good_at_or_above: 75,
            risky_at_or_below: 45,
        },
    }
}

pub fn score_market(input: &MarketInput) -> Assessment {
    market_rules().evaluate(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Health;

    #[test]
    fn test_sizeable_position_is_good() {
        let a = score_portfolio_token(Some("weth"), Some(250.0));
        assert_eq!(a.health, Health::Good);
        assert_eq!(
            a.reasons,
            vec!["ETH-like wrapped asset.", "Tracked price and sizeable position."]
        );
    }

    #[test]
    fn test_unpriced_stablecoin_is_medium() {
        let a = score_portfolio_token(Some("USDbC"), None);
        assert_eq!(a.health, Health::Medium);
        assert_eq!(a.reasons.len(), 2);
    }

    #[test]
    fn test_small_position_is_medium() {
        let a = score_portfolio_token(Some("FOO"), Some(12.5));
        assert_eq!(a.health, Health::Medium);
        assert_eq!(a.reasons, vec!["Tracked price but smaller position."]);
    }

    #[test]
    fn test_unpriced_unknown_token_is_risky() {
        let a = score_portfolio_token(None, Some(0.0));
        assert_eq!(a.health, Health::Risky);
        assert_eq!(
            a.reasons,
            vec!["No price data; may be low-liquidity or off main listings."]
        );
    }

    #[test]
    fn test_deep_mature_market_is_good() {
        let input = MarketInput {
            symbol: Some("USDC".to_string()),
            price_usd: Some(1.0),
            liquidity_usd: Some(5_000_000.0),
            volume_24h_usd: Some(2_000_000.0),
            fdv_usd: Some(50_000_000.0),
            market_cap_usd: Some(50_000_000.0),
            pool_age_days: Some(400.0),
        };
        let a = score_market(&input);
        assert_eq!(a.score, 95);
        assert_eq!(a.health, Health::Good);
        assert_eq!(a.reasons.len(), 5);
    }

    #[test]
    fn test_empty_market_is_risky() {
        let a = score_market(&MarketInput::default());
        assert_eq!(a.score, 35);
        assert_eq!(a.health, Health::Risky);
        assert_eq!(
            a.reasons,
            vec![
                "No DEX liquidity data; treated as illiquid.",
                "No reliable USD price; may be off major listings.",
            ]
        );
    }

    #[test]
    fn test_fresh_thin_launch_clamps_at_zero() {
        let input = MarketInput {
            symbol: Some("NEW".to_string()),
            price_usd: None,
            liquidity_usd: Some(1_000.0),
            volume_24h_usd: Some(100.0),
            fdv_usd: Some(5_000_000.0),
            market_cap_usd: None,
            pool_age_days: Some(0.5),
        };
        let a = score_market(&input);
        // 65 - 25 - 10 - 15 - 15 - 10 = -10
        assert_eq!(a.score, 0);
        assert_eq!(a.health, Health::Risky);
    }

    #[test]
    fn test_pool_age_from_millis() {
        let now = 1_700_000_000_000;
        assert_eq!(pool_age_days(Some(now - 2 * 86_400_000), now), Some(2.0));
        assert_eq!(pool_age_days(Some(0), now), None);
        assert_eq!(pool_age_days(None, now), None);
    }
}
