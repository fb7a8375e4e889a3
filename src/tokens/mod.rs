pub mod dexscreener;
pub mod info;
pub mod portfolio;
pub mod prices;

pub use dexscreener::{pick_best_pair, DexScreenerClient, MarketDataSource};
pub use info::TokenInfoService;
pub use portfolio::{format_balance, PortfolioScanner};
pub use prices::{AlchemyPriceClient, PriceSource};
