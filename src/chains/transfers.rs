use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    chains::client::{decode_result, RpcTransport},
    config::{ActivitySettings, NftSettings},
    models::{Result, TransferCategory, TransferPage, TransferRecord},
};

const METHOD: &str = "alchemy_getAssetTransfers";

/// Which side of a transfer the queried address sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    fn param_key(&self) -> &'static str {
        match self {
            Direction::Outgoing => "fromAddress",
            Direction::Incoming => "toAddress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFilter {
    Wallet { address: String, direction: Direction },
    Contract { contract: String },
}

/// A complete `alchemy_getAssetTransfers` scan, minus the page key
#[derive(Debug, Clone)]
pub struct TransferQuery {
    pub filter: TransferFilter,
    pub categories: Vec<TransferCategory>,
    pub page_size: u32,
    pub max_pages: u32,
}

impl TransferQuery {
    pub fn wallet(address: &str, direction: Direction, settings: &ActivitySettings) -> Self {
        Self {
            filter: TransferFilter::Wallet {
                address: address.to_lowercase(),
                direction,
            },
            categories: TransferCategory::wallet_scan().to_vec(),
            page_size: settings.page_size,
            max_pages: settings.max_pages,
        }
    }

    pub fn nft_contract(contract: &str, settings: &NftSettings) -> Self {
        Self {
            filter: TransferFilter::Contract {
                contract: contract.to_lowercase(),
            },
            categories: TransferCategory::nft_scan().to_vec(),
            page_size: settings.page_size,
            max_pages: settings.max_pages,
        }
    }

    pub fn params(&self, page_key: Option<&str>) -> Value {
        let mut filter = Map::new();

        match &self.filter {
            TransferFilter::Wallet { address, direction } => {
                filter.insert(direction.param_key().to_string(), json!(address));
            }
            TransferFilter::Contract { contract } => {
                filter.insert("fromBlock".to_string(), json!("0x0"));
                filter.insert("toBlock".to_string(), json!("latest"));
                filter.insert("contractAddresses".to_string(), json!([contract]));
            }
        }

        let categories: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();
        filter.insert("category".to_string(), json!(categories));
        filter.insert("withMetadata".to_string(), json!(true));
        filter.insert("excludeZeroValue".to_string(), json!(false));
        filter.insert("maxCount".to_string(), json!(format!("{:#x}", self.page_size)));

        if let Some(key) = page_key {
            filter.insert("pageKey".to_string(), json!(key));
        }

        json!([Value::Object(filter)])
    }
}

/// Follows provider continuation tokens until exhausted or the page cap is hit
pub struct TransferPaginator {
    rpc: Arc<dyn RpcTransport>,
}

impl TransferPaginator {
    pub fn new(rpc: Arc<dyn RpcTransport>) -> Self {
        Self { rpc }
    }

    /// Any failed page aborts the whole scan.
    pub async fn fetch_all(&self, query: &TransferQuery) -> Result<Vec<TransferRecord>> {
        let mut transfers = Vec::new();
        let mut page_key: Option<String> = None;

        for page in 0..query.max_pages {
            let raw = self.rpc.call(METHOD, query.params(page_key.as_deref())).await?;
            let result: TransferPage = decode_result(METHOD, raw)?.unwrap_or_default();

            debug!("Transfer page {} returned {} records", page, result.transfers.len());
            transfers.extend(result.transfers);

            page_key = result.page_key.filter(|k| !k.is_empty());
            if page_key.is_none() {
                return Ok(transfers);
            }
        }

        if page_key.is_some() {
            info!(
                "Transfer scan stopped at the {} page cap with {} records",
                query.max_pages,
                transfers.len()
            );
        }

        Ok(transfers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::client::MockRpcTransport;
    use crate::config::Settings;
    use crate::models::GuardianError;
    use mockall::Sequence;

    fn page(hashes: &[&str], page_key: Option<&str>) -> Value {
        let transfers: Vec<Value> = hashes
            .iter()
            .map(|h| json!({"hash": h, "category": "external"}))
            .collect();
        match page_key {
            Some(key) => json!({"transfers": transfers, "pageKey": key}),
            None => json!({"transfers": transfers}),
        }
    }

    fn wallet_query() -> TransferQuery {
        TransferQuery::wallet("0xABC", Direction::Outgoing, &Settings::default().activity)
    }

    #[test]
    fn test_wallet_params() {
        let params = wallet_query().params(None);
        let filter = &params[0];
        assert_eq!(filter["fromAddress"], "0xabc");
        assert_eq!(filter["maxCount"], "0x3e8");
        assert_eq!(filter["category"], json!(["external", "erc20", "erc721", "erc1155"]));
        assert!(filter.get("pageKey").is_none());

        let next = wallet_query().params(Some("k1"));
        assert_eq!(next[0]["pageKey"], "k1");
    }

    #[test]
    fn test_contract_params() {
        let query = TransferQuery::nft_contract("0xC0FFEE", &Settings::default().nft);
        let filter = &query.params(None)[0];
        assert_eq!(filter["contractAddresses"], json!(["0xc0ffee"]));
        assert_eq!(filter["fromBlock"], "0x0");
        assert_eq!(filter["maxCount"], "0x64");
        assert_eq!(filter["category"], json!(["erc721", "erc1155"]));
    }

    #[tokio::test]
    async fn test_follows_page_key_once() {
        let mut rpc = MockRpcTransport::new();
        let mut seq = Sequence::new();

        rpc.expect_call()
            .withf(|method, params| method == METHOD && params[0].get("pageKey").is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(page(&["0x1", "0x2"], Some("next"))));
        rpc.expect_call()
            .withf(|_, params| params[0]["pageKey"] == "next")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(page(&["0x3"], None)));

        let paginator = TransferPaginator::new(Arc::new(rpc));
        let records = paginator.fetch_all(&wallet_query()).await.unwrap();

        let hashes: Vec<&str> = records
            .iter()
            .map(|r| r.hash.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(hashes, vec!["0x1", "0x2", "0x3"]);
    }

    #[tokio::test]
    async fn test_page_cap_truncates_silently() {
        let mut rpc = MockRpcTransport::new();
        rpc.expect_call()
            .times(2)
            .returning(|_, _| Ok(page(&["0xa"], Some("more"))));

        let mut query = wallet_query();
        query.max_pages = 2;

        let paginator = TransferPaginator::new(Arc::new(rpc));
        let records = paginator.fetch_all(&query).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_null_hash_does_not_fail_page() {
        let mut rpc = MockRpcTransport::new();
        rpc.expect_call().times(1).returning(|_, _| {
            Ok(json!({"transfers": [
                {"hash": null, "category": "erc20"},
                {"hash": "0x9", "category": "external"}
            ]}))
        });

        let paginator = TransferPaginator::new(Arc::new(rpc));
        let records = paginator.fetch_all(&wallet_query()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].normalized_hash(), None);
        assert_eq!(records[1].normalized_hash().as_deref(), Some("0x9"));
    }

    #[tokio::test]
    async fn test_error_aborts_scan() {
        let mut rpc = MockRpcTransport::new();
        let mut seq = Sequence::new();
        rpc.expect_call()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(page(&["0x1"], Some("next"))));
        rpc.expect_call()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|method, _| Err(GuardianError::rpc(method, "boom")));

        let paginator = TransferPaginator::new(Arc::new(rpc));
        assert!(paginator.fetch_all(&wallet_query()).await.is_err());
    }
}
