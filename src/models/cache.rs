use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::WalletActivitySummary;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Address-keyed wallet summary cache with lazy expiry.
///
/// Expired entries are removed when they are read; `cleanup_expired`
/// sweeps the whole map for callers that want eager eviction.
#[derive(Debug, Clone)]
pub struct SummaryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry<WalletActivitySummary>>>>,
    ttl: Duration,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, address: &str) -> Option<WalletActivitySummary> {
        let key = CacheKey::wallet(address);

        {
            let cache = self.entries.read().ok()?;
            let entry = cache.get(&key)?;
            if !entry.is_expired() {
                return Some(entry.value.clone());
            }
        }

        if let Ok(mut cache) = self.entries.write() {
            if cache.get(&key).map_or(false, |e| e.is_expired()) {
                cache.remove(&key);
                debug!("Evicted expired summary for {}", key);
            }
        }
        None
    }

    pub fn insert(&self, address: &str, summary: WalletActivitySummary) {
        if let Ok(mut cache) = self.entries.write() {
            cache.insert(CacheKey::wallet(address), CacheEntry::new(summary, self.ttl));
        }
    }

    /// Clean up expired entries
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
    }
}

pub struct CacheKey;

impl CacheKey {
    pub fn wallet(address: &str) -> String {
        address.trim().to_lowercase()
    }
}
