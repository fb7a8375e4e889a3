pub mod nft;
pub mod rules;
pub mod token;

pub use nft::{score_collection, CollectionInput};
pub use rules::{HealthBands, Rule, RuleSet};
pub use token::{is_stable_symbol, score_market, score_portfolio_token, MarketInput};
