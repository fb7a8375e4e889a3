use futures::future::join_all;
use serde_json::json;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    chains::{
        client::{decode_result, RpcTransport},
        resilience::{retry_with_backoff, RetryConfig},
    },
    models::{Receipt, Result},
};

const METHOD: &str = "eth_getTransactionReceipt";

/// Apply `f` to every item with at most `limit` calls in flight.
///
/// `min(limit, n)` workers pull indices from a shared cursor; each result is
/// stored at its item's original index, so output order matches input order
/// whatever order the calls complete in.
pub async fn map_with_concurrency<'a, T, R, F, Fut>(items: &'a [T], limit: usize, f: F) -> Vec<R>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = R>,
{
    let cursor = AtomicUsize::new(0);
    let workers = limit.max(1).min(items.len());

    let cursor = &cursor;
    let f = &f;
    let worker = move || async move {
        let mut done = Vec::new();
        loop {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(item) = items.get(index) else { break };
            done.push((index, f(item).await));
        }
        done
    };

    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    for (index, result) in join_all((0..workers).map(|_| worker())).await.into_iter().flatten() {
        slots[index] = Some(result);
    }

    slots.into_iter().flatten().collect()
}

/// Fetches transaction receipts with bounded concurrency and per-hash retry
pub struct ReceiptFetcher {
    rpc: Arc<dyn RpcTransport>,
    retry: RetryConfig,
    concurrency: usize,
}

impl ReceiptFetcher {
    pub fn new(rpc: Arc<dyn RpcTransport>, retry: RetryConfig, concurrency: usize) -> Self {
        Self {
            rpc,
            retry,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_receipt(&self, hash: &str) -> Result<Option<Receipt>> {
        let raw = self.rpc.call(METHOD, json!([hash])).await?;
        decode_result(METHOD, raw)
    }

    /// One entry per input hash, in input order. A hash whose retries are
    /// exhausted yields `None` instead of failing the batch.
    pub async fn fetch_all(&self, hashes: &[String]) -> Vec<Option<Receipt>> {
        debug!(
            "Fetching {} receipts with concurrency {}",
            hashes.len(),
            self.concurrency
        );

        map_with_concurrency(hashes, self.concurrency, move |hash| async move {
            match retry_with_backoff(&self.retry, METHOD, || self.fetch_receipt(hash)).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    warn!("Giving up on receipt for {}: {}", hash, e);
                    None
                }
            }
        })
        .await
    }
}
