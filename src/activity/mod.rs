pub mod aggregator;
pub mod stats;

pub use aggregator::WalletActivityAggregator;
pub use stats::{attribute_gas, count_activity, dominant_category, unique_hashes, ActivityCounts};
