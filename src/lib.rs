pub mod models;
pub mod config;
pub mod chains;
pub mod activity;
pub mod scoring;
pub mod tokens;
pub mod nft;
pub mod social;
pub mod api;
pub mod utils;

pub use models::{GuardianError, Result, WalletActivity, WalletActivitySummary};
pub use config::{Settings, RpcConfig};
pub use activity::WalletActivityAggregator;
pub use api::{create_router, AppState};
