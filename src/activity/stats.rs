use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::models::{TransferCategory, TransferRecord};

/// Hash and day counts derived from the union of both transfer directions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityCounts {
    pub lifetime_tx_count: u32,
    pub window_tx_count: u32,
    pub active_days: u32,
    pub avg_tx_per_active_day: f64,
}

fn in_window(transfer: &TransferRecord, cutoff: DateTime<Utc>) -> bool {
    transfer.timestamp().map_or(false, |ts| ts >= cutoff)
}

pub fn count_activity<'a, I>(transfers: I, cutoff: DateTime<Utc>) -> ActivityCounts
where
    I: IntoIterator<Item = &'a TransferRecord>,
{
    let mut lifetime = HashSet::new();
    let mut window = HashSet::new();
    let mut days = HashSet::new();

    for transfer in transfers {
        let Some(hash) = transfer.normalized_hash() else { continue };

        if let Some(ts) = transfer.timestamp().filter(|ts| *ts >= cutoff) {
            window.insert(hash.clone());
            days.insert(ts.format("%Y-%m-%d").to_string());
        }
        lifetime.insert(hash);
    }

    let avg_tx_per_active_day = if days.is_empty() {
        0.0
    } else {
        window.len() as f64 / days.len() as f64
    };

    ActivityCounts {
        lifetime_tx_count: lifetime.len() as u32,
        window_tx_count: window.len() as u32,
        active_days: days.len() as u32,
        avg_tx_per_active_day,
    }
}

/// Most frequent category, counted over the window when it has any
/// transactions and over everything otherwise. Ties go to the category
/// encountered first.
pub fn dominant_category(
    transfers: &[&TransferRecord],
    cutoff: DateTime<Utc>,
    window_has_activity: bool,
) -> Option<TransferCategory> {
    let mut counts: Vec<(TransferCategory, u32)> = Vec::new();

    let source = transfers
        .iter()
        .filter(|t| !window_has_activity || in_window(t, cutoff));

    for transfer in source {
        let category = transfer.category_or_unknown();
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category, 1)),
        }
    }

    let mut best: Option<(TransferCategory, u32)> = None;
    for (category, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((category, n));
        }
    }
    best.map(|(category, _)| category)
}

/// Distinct outgoing hashes in order of first appearance
pub fn unique_hashes(transfers: &[TransferRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    transfers
        .iter()
        .filter_map(|t| t.normalized_hash())
        .filter(|h| seen.insert(h.clone()))
        .collect()
}

/// Sum gas by re-walking the outgoing transfers. Every record with a hash
/// adds its transaction's gas, and the record's own timestamp decides window
/// membership.
pub fn attribute_gas(
    outgoing: &[TransferRecord],
    gas_by_hash: &HashMap<String, f64>,
    cutoff: DateTime<Utc>,
) -> (f64, f64) {
    let mut lifetime = 0.0;
    let mut window = 0.0;

    for transfer in outgoing {
        let Some(hash) = transfer.normalized_hash() else { continue };
        let gas = gas_by_hash.get(&hash).copied().unwrap_or(0.0);

        lifetime += gas;
        if in_window(transfer, cutoff) {
            window += gas;
        }
    }

    (lifetime, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn transfer(hash: &str, category: &str, ts: Option<DateTime<Utc>>) -> TransferRecord {
        serde_json::from_value(json!({
            "hash": hash,
            "category": category,
            "metadata": { "blockTimestamp": ts.map(|t| t.to_rfc3339()) },
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-30T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_no_transfers() {
        let counts = count_activity(&[], now() - Duration::days(30));
        assert_eq!(counts, ActivityCounts::default());
        assert_eq!(counts.avg_tx_per_active_day, 0.0);
    }

    #[test]
    fn test_duplicate_hashes_count_once() {
        let ts = Some(now() - Duration::days(2));
        let transfers = vec![
            transfer("0xAA", "erc20", ts),
            transfer("0xaa", "erc20", ts),
            transfer("0xbb", "external", ts),
        ];
        let counts = count_activity(&transfers, now() - Duration::days(30));
        assert_eq!(counts.lifetime_tx_count, 2);
        assert_eq!(counts.window_tx_count, 2);
        assert_eq!(counts.active_days, 1);
        assert_eq!(counts.avg_tx_per_active_day, 2.0);
    }

    #[test]
    fn test_untimed_transfers_only_count_for_lifetime() {
        let transfers = vec![
            transfer("0x1", "erc20", None),
            transfer("0x2", "erc20", Some(now() - Duration::days(45))),
            transfer("0x3", "erc20", Some(now() - Duration::days(1))),
            transfer("0x4", "erc20", Some(now() - Duration::days(3))),
        ];
        let counts = count_activity(&transfers, now() - Duration::days(30));
        assert_eq!(counts.lifetime_tx_count, 4);
        assert_eq!(counts.window_tx_count, 2);
        assert_eq!(counts.active_days, 2);
        assert!(counts.window_tx_count <= counts.lifetime_tx_count);
    }

    #[test]
    fn test_dominant_category_prefers_window() {
        let old = Some(now() - Duration::days(90));
        let recent = Some(now() - Duration::days(1));
        let transfers = vec![
            transfer("0x1", "erc721", old),
            transfer("0x2", "erc721", old),
            transfer("0x3", "erc721", old),
            transfer("0x4", "erc20", recent),
        ];
        let refs: Vec<&TransferRecord> = transfers.iter().collect();
        let cutoff = now() - Duration::days(30);

        assert_eq!(dominant_category(&refs, cutoff, true), Some(TransferCategory::Erc20));
        assert_eq!(dominant_category(&refs, cutoff, false), Some(TransferCategory::Erc721));
    }

    #[test]
    fn test_dominant_category_tie_goes_to_first_seen() {
        let ts = Some(now() - Duration::days(1));
        let transfers = vec![
            transfer("0x1", "erc1155", ts),
            transfer("0x2", "external", ts),
        ];
        let refs: Vec<&TransferRecord> = transfers.iter().collect();
        assert_eq!(
            dominant_category(&refs, now() - Duration::days(30), true),
            Some(TransferCategory::Erc1155)
        );
        assert_eq!(dominant_category(&[], now(), false), None);
    }

    #[test]
    fn test_gas_follows_each_outgoing_record() {
        let recent = Some(now() - Duration::days(5));
        let old = Some(now() - Duration::days(50));
        let outgoing = vec![
            transfer("0x1", "erc20", recent),
            transfer("0x1", "erc20", recent),
            transfer("0x2", "external", old),
            transfer("0x3", "external", recent),
        ];
        let mut gas = HashMap::new();
        gas.insert("0x1".to_string(), 0.5);
        gas.insert("0x2".to_string(), 0.25);

        let (lifetime, window) = attribute_gas(&outgoing, &gas, now() - Duration::days(30));
        assert_eq!(lifetime, 1.25);
        assert_eq!(window, 1.0);
        assert_eq!(unique_hashes(&outgoing), vec!["0x1", "0x2", "0x3"]);
    }

    #[test]
    fn test_gas_window_uses_timed_record_of_hash() {
        let recent = Some(now() - Duration::days(3));
        let outgoing = vec![
            transfer("0xa", "erc20", recent),
            transfer("0xa", "erc20", recent),
            transfer("0xb", "erc20", None),
            transfer("0xb", "external", recent),
        ];
        let mut gas = HashMap::new();
        gas.insert("0xa".to_string(), 0.5);
        gas.insert("0xb".to_string(), 0.25);
        let cutoff = now() - Duration::days(30);

        let (lifetime, window) = attribute_gas(&outgoing, &gas, cutoff);
        assert_eq!(lifetime, 1.5);
        assert_eq!(window, 1.25);

        let counts = count_activity(&outgoing, cutoff);
        assert_eq!(counts.window_tx_count, 2);
    }

    #[test]
    fn test_null_hash_is_skipped() {
        let outgoing: Vec<TransferRecord> = serde_json::from_value(json!([
            {"hash": null, "category": "erc20"},
            {"hash": "0xc", "category": "erc20"}
        ]))
        .unwrap();
        let mut gas = HashMap::new();
        gas.insert("0xc".to_string(), 0.5);

        let (lifetime, _) = attribute_gas(&outgoing, &gas, now());
        assert_eq!(lifetime, 0.5);
        assert_eq!(count_activity(&outgoing, now()).lifetime_tx_count, 1);
        assert_eq!(unique_hashes(&outgoing), vec!["0xc"]);
    }
}
