use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::models::{GuardianError, Result, BASE_CHAIN};

const SERVICE: &str = "Alchemy Prices";

/// USD spot prices keyed by lowercase contract address
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Never fails: an unavailable price feed yields an empty map.
    async fn usd_prices(&self, addresses: &[String]) -> HashMap<String, f64>;
}

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    data: Vec<PriceItem>,
}

#[derive(Debug, Deserialize)]
struct PriceItem {
    address: Option<String>,
    #[serde(default)]
    prices: Vec<PricePoint>,
}

#[derive(Debug, Deserialize)]
struct PricePoint {
    currency: Option<String>,
    value: Option<String>,
}

/// Alchemy token prices by address, one POST per batch
pub struct AlchemyPriceClient {
    http_client: reqwest::Client,
    prices_url: Option<String>,
}

impl AlchemyPriceClient {
    pub fn new(http_client: reqwest::Client, prices_url: Option<String>) -> Self {
        Self {
            http_client,
            prices_url,
        }
    }

    async fn fetch_prices(&self, url: &str, addresses: &[String]) -> Result<HashMap<String, f64>> {
        let body = json!({
            "addresses": addresses
                .iter()
                .map(|a| json!({ "network": BASE_CHAIN, "address": a }))
                .collect::<Vec<_>>(),
        });

        let response = self.http_client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GuardianError::upstream(SERVICE, format!("status {}: {}", status, text)));
        }

        let parsed: PricesResponse = response.json().await?;
        Ok(usd_price_map(parsed))
    }
}

fn usd_price_map(response: PricesResponse) -> HashMap<String, f64> {
    let mut prices = HashMap::new();
    for item in response.data {
        let Some(address) = item.address.map(|a| a.to_lowercase()).filter(|a| !a.is_empty()) else {
            continue;
        };
        let usd = item
            .prices
            .iter()
            .find(|p| p.currency.as_deref() == Some("USD"))
            .and_then(|p| p.value.as_deref())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite());

        if let Some(usd) = usd {
            prices.insert(address, usd);
        }
    }
    prices
}

#[async_trait]
impl PriceSource for AlchemyPriceClient {
    async fn usd_prices(&self, addresses: &[String]) -> HashMap<String, f64> {
        let Some(url) = self.prices_url.as_deref() else {
            return HashMap::new();
        };

        let unique: Vec<String> = addresses
            .iter()
            .map(|a| a.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique.is_empty() {
            return HashMap::new();
        }

        match self.fetch_prices(url, &unique).await {
            Ok(prices) => {
                debug!("Priced {} of {} tokens", prices.len(), unique.len());
                prices
            }
            Err(e) => {
                warn!("Price lookup failed, continuing without prices: {}", e);
                HashMap::new()
            }
        }
    }
}
