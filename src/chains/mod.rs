pub mod client;
pub mod alchemy;
pub mod resilience;
pub mod transfers;
pub mod receipts;
pub mod gas;

pub use client::RpcTransport;
pub use alchemy::AlchemyRpcClient;
pub use transfers::{Direction, TransferPaginator, TransferQuery};
pub use receipts::{map_with_concurrency, ReceiptFetcher};
pub use resilience::{retry_with_backoff, RetryConfig};
