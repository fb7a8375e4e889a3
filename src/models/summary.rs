use serde::{Deserialize, Serialize};

use crate::models::{category_label, TransferCategory};
use crate::utils::round_dp;

pub const BASE_CHAIN: &str = "base-mainnet";

/// Day-level activity of one wallet, computed once per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletActivitySummary {
    pub last_30d_tx_count: u32,
    pub lifetime_tx_count: u32,
    pub last_30d_gas_eth: f64,
    pub lifetime_gas_eth: f64,
    pub most_common_category: Option<TransferCategory>,
    pub active_days_last_30d: u32,
    pub avg_tx_per_active_day_30d: f64,
}

impl Default for WalletActivitySummary {
    fn default() -> Self {
        Self {
            last_30d_tx_count: 0,
            lifetime_tx_count: 0,
            last_30d_gas_eth: 0.0,
            lifetime_gas_eth: 0.0,
            most_common_category: None,
            active_days_last_30d: 0,
            avg_tx_per_active_day_30d: 0.0,
        }
    }
}

/// Payload of the wallet endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletActivity {
    pub address: String,
    pub chain: String,
    pub summary: WalletActivityView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletActivityView {
    #[serde(rename = "last30dGasEth")]
    pub last_30d_gas_eth: f64,
    pub lifetime_gas_eth: f64,
    #[serde(rename = "last30dTxCount")]
    pub last_30d_tx_count: u32,
    pub lifetime_tx_count: u32,
    pub most_common_tx_type: String,
    #[serde(rename = "activeDaysLast30d")]
    pub active_days_last_30d: u32,
    #[serde(rename = "avgTxPerActiveDay30d")]
    pub avg_tx_per_active_day_30d: f64,
}

impl WalletActivity {
    pub fn new(address: String, summary: &WalletActivitySummary) -> Self {
        Self {
            address,
            chain: BASE_CHAIN.to_string(),
            summary: WalletActivityView {
                last_30d_gas_eth: round_dp(summary.last_30d_gas_eth, 6),
                lifetime_gas_eth: round_dp(summary.lifetime_gas_eth, 6),
                last_30d_tx_count: summary.last_30d_tx_count,
                lifetime_tx_count: summary.lifetime_tx_count,
                most_common_tx_type: category_label(summary.most_common_category).to_string(),
                active_days_last_30d: summary.active_days_last_30d,
                avg_tx_per_active_day_30d: round_dp(summary.avg_tx_per_active_day_30d, 2),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_shapes_payload() {
        let summary = WalletActivitySummary {
            last_30d_tx_count: 7,
            lifetime_tx_count: 40,
            last_30d_gas_eth: 0.0012,
            lifetime_gas_eth: 0.0345,
            most_common_category: Some(TransferCategory::Erc20),
            active_days_last_30d: 3,
            avg_tx_per_active_day_30d: 7.0 / 3.0,
        };

        let payload = serde_json::to_value(WalletActivity::new("0xabc".to_string(), &summary)).unwrap();
        assert_eq!(payload["chain"], "base-mainnet");
        assert_eq!(payload["summary"]["mostCommonTxType"], "ERC-20 transfers");
        assert_eq!(payload["summary"]["last30dTxCount"], 7);
        assert_eq!(payload["summary"]["avgTxPerActiveDay30d"], 2.33);
        assert_eq!(payload["summary"]["activeDaysLast30d"], 3);
    }
}
