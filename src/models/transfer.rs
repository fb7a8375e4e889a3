use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Asset category reported by `alchemy_getAssetTransfers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferCategory {
    External,
    Erc20,
    Erc721,
    Erc1155,
    #[serde(other)]
    Unknown,
}

impl TransferCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferCategory::External => "external",
            TransferCategory::Erc20 => "erc20",
            TransferCategory::Erc721 => "erc721",
            TransferCategory::Erc1155 => "erc1155",
            TransferCategory::Unknown => "unknown",
        }
    }

    /// Categories requested when scanning a wallet
    pub fn wallet_scan() -> &'static [TransferCategory] {
        &[
            TransferCategory::External,
            TransferCategory::Erc20,
            TransferCategory::Erc721,
            TransferCategory::Erc1155,
        ]
    }

    /// Categories requested when scanning an NFT contract
    pub fn nft_scan() -> &'static [TransferCategory] {
        &[TransferCategory::Erc721, TransferCategory::Erc1155]
    }
}

/// Human label shown for the dominant category of a wallet
pub fn category_label(category: Option<TransferCategory>) -> &'static str {
    match category {
        None => "Mixed",
        Some(TransferCategory::External) => "Native transfers",
        Some(TransferCategory::Erc20) => "ERC-20 transfers",
        Some(TransferCategory::Erc721) => "NFT trades (ERC-721)",
        Some(TransferCategory::Erc1155) => "NFT trades (ERC-1155)",
        Some(TransferCategory::Unknown) => "Mixed activity",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    pub block_timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc1155Entry {
    pub token_id: Option<String>,
    pub value: Option<String>,
}

/// One transfer as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub hash: Option<String>,
    pub block_num: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub asset: Option<String>,
    pub category: Option<TransferCategory>,
    pub erc721_token_id: Option<String>,
    pub erc1155_metadata: Option<Vec<Erc1155Entry>>,
    pub metadata: Option<TransferMetadata>,
}

impl TransferRecord {
    /// Block timestamp, or `None` when absent or unparsable
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.metadata.as_ref()?.block_timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Lowercased transaction hash, `None` for records without one
    pub fn normalized_hash(&self) -> Option<String> {
        self.hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(str::to_lowercase)
    }

    pub fn category_or_unknown(&self) -> TransferCategory {
        self.category.unwrap_or(TransferCategory::Unknown)
    }

    pub fn token_id(&self) -> Option<&str> {
        if let Some(id) = self.erc721_token_id.as_deref() {
            return Some(id);
        }
        self.erc1155_metadata
            .as_ref()
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.token_id.as_deref())
    }
}

/// One page of `alchemy_getAssetTransfers`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPage {
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
    pub page_key: Option<String>,
}

/// Gas fields of `eth_getTransactionReceipt`, hex-encoded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub gas_used: Option<String>,
    pub effective_gas_price: Option<String>,
    pub gas_price: Option<String>,
}
