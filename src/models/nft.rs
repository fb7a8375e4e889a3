use serde::{Deserialize, Serialize};

use crate::models::Health;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCollectionSummary {
    pub contract_address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub token_standard: TokenStandard,
    pub total_supply: Option<u64>,
    pub num_owners: Option<u64>,
    pub floor_price_native: Option<f64>,
    pub floor_price_symbol: Option<String>,
    pub market_cap: Option<f64>,
    pub sample_token_id: Option<String>,
    pub health: Health,
    pub reasons: Vec<String>,
}
