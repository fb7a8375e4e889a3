use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    chains::{RpcTransport, TransferPaginator, TransferQuery},
    config::NftSettings,
    models::{NftCollectionSummary, Result, TokenStandard, TransferCategory, TransferRecord},
    nft::abi::{decode_abi_string, decode_abi_uint},
    scoring::{score_collection, CollectionInput},
};

const NAME_SELECTOR: &str = "0x06fdde03";
const SYMBOL_SELECTOR: &str = "0x95d89b41";
const TOTAL_SUPPLY_SELECTOR: &str = "0x18160ddd";

/// Summarizes an NFT collection from contract reads and its transfer history
pub struct CollectionScanner {
    rpc: Arc<dyn RpcTransport>,
    paginator: TransferPaginator,
    settings: NftSettings,
}

impl CollectionScanner {
    pub fn new(rpc: Arc<dyn RpcTransport>, settings: NftSettings) -> Self {
        Self {
            paginator: TransferPaginator::new(rpc.clone()),
            rpc,
            settings,
        }
    }

    /// Raw `eth_call` result; failures and empty returns are `None`
    async fn read(&self, contract: &str, selector: &str) -> Option<String> {
        let params = json!([{ "to": contract, "data": selector }, "latest"]);
        match self.rpc.call("eth_call", params).await {
            Ok(Value::String(hex)) if !hex.is_empty() && hex != "0x" => Some(hex),
            Ok(_) => None,
            Err(e) => {
                debug!("eth_call {} on {} failed: {}", selector, contract, e);
                None
            }
        }
    }

    async fn read_string(&self, contract: &str, selector: &str) -> Option<String> {
        decode_abi_string(&self.read(contract, selector).await?)
    }

    async fn read_uint(&self, contract: &str, selector: &str) -> Option<u64> {
        decode_abi_uint(&self.read(contract, selector).await?)
    }

    pub async fn summarize(&self, contract: &str) -> Result<NftCollectionSummary> {
        let contract = contract.to_lowercase();

        let (name, symbol, total_supply) = futures::join!(
            self.read_string(&contract, NAME_SELECTOR),
            self.read_string(&contract, SYMBOL_SELECTOR),
            self.read_uint(&contract, TOTAL_SUPPLY_SELECTOR),
        );

        let query = TransferQuery::nft_contract(&contract, &self.settings);
        let transfers = self.paginator.fetch_all(&query).await?;

        let owners = unique_owners(&transfers);
        let num_owners = (owners > 0).then_some(owners);
        let sample_token_id = transfers.iter().find_map(|t| t.token_id()).map(String::from);
        let token_standard = infer_token_standard(&transfers);

        info!(
            "Collection {}: {} transfers, {} owners",
            contract,
            transfers.len(),
            owners
        );

        let assessment = score_collection(CollectionInput {
            total_supply,
            num_owners,
        });

        Ok(NftCollectionSummary {
            contract_address: contract,
            name,
            symbol,
            token_standard,
            total_supply,
            num_owners,
            floor_price_native: None,
            floor_price_symbol: Some("ETH".to_string()),
            market_cap: None,
            sample_token_id,
            health: assessment.health,
            reasons: assessment.reasons,
        })
    }
}

/// Distinct lowercase recipients
pub fn unique_owners(transfers: &[TransferRecord]) -> u64 {
    transfers
        .iter()
        .filter_map(|t| t.to.as_deref())
        .filter(|to| !to.is_empty())
        .map(|to| to.to_lowercase())
        .collect::<HashSet<_>>()
        .len() as u64
}

pub fn infer_token_standard(transfers: &[TransferRecord]) -> TokenStandard {
    let (erc721, erc1155) = transfers.iter().fold((0, 0), |(a, b), t| match t.category {
        Some(TransferCategory::Erc721) => (a + 1, b),
        Some(TransferCategory::Erc1155) => (a, b + 1),
        _ => (a, b),
    });

    if erc721 == 0 && erc1155 == 0 {
        TokenStandard::Unknown
    } else if erc721 >= erc1155 {
        TokenStandard::Erc721
    } else {
        TokenStandard::Erc1155
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::client::MockRpcTransport;
    use crate::config::Settings;
    use crate::models::{GuardianError, Health};

    fn word(n: u64) -> String {
        format!("{:064x}", n)
    }

    fn abi_string(s: &str) -> String {
        format!("0x{}{}{:0<64}", word(32), word(s.len() as u64), hex::encode(s))
    }

    fn transfer(to: &str, category: &str, token: serde_json::Value) -> serde_json::Value {
        let mut t = json!({"hash": "0x1", "from": "0x0", "to": to, "category": category});
        if category == "erc721" {
            t["erc721TokenId"] = token;
        } else {
            t["erc1155Metadata"] = json!([{ "tokenId": token, "value": "0x1" }]);
        }
        t
    }

    fn records(values: Vec<serde_json::Value>) -> Vec<TransferRecord> {
        serde_json::from_value(json!(values)).unwrap()
    }

    #[test]
    fn test_token_standard_inference() {
        assert_eq!(infer_token_standard(&[]), TokenStandard::Unknown);

        let mixed = records(vec![
            transfer("0xa", "erc721", json!("0x1")),
            transfer("0xb", "erc1155", json!("0x2")),
        ]);
        assert_eq!(infer_token_standard(&mixed), TokenStandard::Erc721);

        let multi = records(vec![
            transfer("0xa", "erc1155", json!("0x1")),
            transfer("0xb", "erc1155", json!("0x2")),
            transfer("0xc", "erc721", json!("0x3")),
        ]);
        assert_eq!(infer_token_standard(&multi), TokenStandard::Erc1155);
    }

    #[test]
    fn test_owner_count_is_case_insensitive() {
        let transfers = records(vec![
            transfer("0xAA", "erc721", json!("0x1")),
            transfer("0xaa", "erc721", json!("0x2")),
            transfer("0xbb", "erc721", json!("0x3")),
        ]);
        assert_eq!(unique_owners(&transfers), 2);
    }

    #[tokio::test]
    async fn test_summarize_collection() {
        let mut rpc = MockRpcTransport::new();
        rpc.expect_call()
            .withf(|method, params| method == "eth_call" && params[0]["data"] == NAME_SELECTOR)
            .returning(|_, _| Ok(json!(abi_string("Base Cats"))));
        rpc.expect_call()
            .withf(|method, params| method == "eth_call" && params[0]["data"] == SYMBOL_SELECTOR)
            .returning(|method, _| Err(GuardianError::rpc(method, "execution reverted")));
        rpc.expect_call()
            .withf(|method, params| {
                method == "eth_call" && params[0]["data"] == TOTAL_SUPPLY_SELECTOR
            })
            .returning(|_, _| Ok(json!(format!("0x{}", word(4_000)))));
        rpc.expect_call()
            .withf(|method, params| {
                method == "alchemy_getAssetTransfers"
                    && params[0]["contractAddresses"][0] == "0xcats"
                    && params[0]["maxCount"] == "0x64"
            })
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "transfers": [
                        transfer("0xOne", "erc721", json!("0x2a")),
                        transfer("0xtwo", "erc721", json!("0x2b")),
                    ]
                }))
            });

        let scanner = CollectionScanner::new(Arc::new(rpc), Settings::default().nft);
        let summary = scanner.summarize("0xCATS").await.unwrap();

        assert_eq!(summary.contract_address, "0xcats");
        assert_eq!(summary.name.as_deref(), Some("Base Cats"));
        assert_eq!(summary.symbol, None);
        assert_eq!(summary.total_supply, Some(4_000));
        assert_eq!(summary.num_owners, Some(2));
        assert_eq!(summary.sample_token_id.as_deref(), Some("0x2a"));
        assert_eq!(summary.token_standard, TokenStandard::Erc721);
        assert_eq!(summary.floor_price_symbol.as_deref(), Some("ETH"));
        // supply +2, few holders
        assert_eq!(summary.health, Health::Medium);
    }

    #[tokio::test]
    async fn test_transfer_failure_fails_summary() {
        let mut rpc = MockRpcTransport::new();
        rpc.expect_call()
            .withf(|method, _| method == "eth_call")
            .returning(|_, _| Ok(json!("0x")));
        rpc.expect_call()
            .withf(|method, _| method == "alchemy_getAssetTransfers")
            .returning(|method, _| Err(GuardianError::rpc(method, "HTTP 503")));

        let scanner = CollectionScanner::new(Arc::new(rpc), Settings::default().nft);
        assert!(scanner.summarize("0xcats").await.is_err());
    }
}
