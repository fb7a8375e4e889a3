use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    activity::stats::{attribute_gas, count_activity, dominant_category, unique_hashes},
    chains::{
        gas::receipt_cost_eth, Direction, ReceiptFetcher, RetryConfig, RpcTransport,
        TransferPaginator, TransferQuery,
    },
    config::{ActivitySettings, MAX_WINDOW_DAYS},
    models::{Result, SummaryCache, TransferRecord, WalletActivitySummary},
    utils::round_dp,
};

/// Builds the wallet activity summary from transfer history and receipts
pub struct WalletActivityAggregator {
    paginator: TransferPaginator,
    receipts: ReceiptFetcher,
    settings: ActivitySettings,
}

impl WalletActivityAggregator {
    pub fn new(rpc: Arc<dyn RpcTransport>, settings: ActivitySettings) -> Self {
        let receipts = ReceiptFetcher::new(
            rpc.clone(),
            RetryConfig::from_settings(&settings),
            settings.receipt_concurrency,
        );

        Self {
            paginator: TransferPaginator::new(rpc),
            receipts,
            settings,
        }
    }

    pub async fn summarize(&self, address: &str) -> Result<WalletActivitySummary> {
        self.summarize_at(address, Utc::now()).await
    }

    /// Summary with the activity window anchored at `now`. All-or-nothing:
    /// any transfer or decoding failure is returned as an error.
    pub async fn summarize_at(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<WalletActivitySummary> {
        let address = address.to_lowercase();
        let window_days = self.settings.window_days.clamp(1, MAX_WINDOW_DAYS);
        let cutoff = now - Duration::days(window_days);

        let outgoing_query = TransferQuery::wallet(&address, Direction::Outgoing, &self.settings);
        let incoming_query = TransferQuery::wallet(&address, Direction::Incoming, &self.settings);

        let (outgoing, incoming) = futures::try_join!(
            self.paginator.fetch_all(&outgoing_query),
            self.paginator.fetch_all(&incoming_query),
        )?;

        info!(
            "Fetched {} outgoing and {} incoming transfers for {}",
            outgoing.len(),
            incoming.len(),
            address
        );

        let all: Vec<&TransferRecord> = outgoing.iter().chain(incoming.iter()).collect();
        let counts = count_activity(all.iter().copied(), cutoff);
        let most_common_category = dominant_category(&all, cutoff, counts.window_tx_count > 0);

        let gas_by_hash = self.gas_by_hash(&outgoing).await?;
        let (lifetime_gas, window_gas) = attribute_gas(&outgoing, &gas_by_hash, cutoff);

        Ok(WalletActivitySummary {
            last_30d_tx_count: counts.window_tx_count,
            lifetime_tx_count: counts.lifetime_tx_count,
            last_30d_gas_eth: round_dp(window_gas, 4),
            lifetime_gas_eth: round_dp(lifetime_gas, 4),
            most_common_category,
            active_days_last_30d: counts.active_days,
            avg_tx_per_active_day_30d: counts.avg_tx_per_active_day,
        })
    }

    /// Gas cost of every outgoing transaction whose receipt could be fetched
    async fn gas_by_hash(&self, outgoing: &[TransferRecord]) -> Result<HashMap<String, f64>> {
        let hashes = unique_hashes(outgoing);
        let receipts = self.receipts.fetch_all(&hashes).await;

        let mut gas = HashMap::new();
        for (hash, receipt) in hashes.into_iter().zip(receipts) {
            let Some(receipt) = receipt else { continue };
            let cost = receipt_cost_eth(&receipt)?;
            if cost > 0.0 {
                gas.insert(hash, cost);
            }
        }

        debug!("Priced {} outgoing transactions", gas.len());
        Ok(gas)
    }

    /// Cached summary when fresh, otherwise a new one stored in `cache`
    pub async fn summarize_cached(
        &self,
        cache: &SummaryCache,
        address: &str,
    ) -> Result<WalletActivitySummary> {
        if let Some(summary) = cache.get(address) {
            debug!("Summary cache hit for {}", address);
            return Ok(summary);
        }

        let summary = self.summarize(address).await?;
        cache.insert(address, summary.clone());
        Ok(summary)
    }
}
