pub mod error;
pub mod transfer;
pub mod summary;
pub mod score;
pub mod token;
pub mod nft;
pub mod profile;
pub mod cache;

pub use error::*;
pub use transfer::*;
pub use summary::*;
pub use score::*;
pub use token::*;
pub use nft::*;
pub use profile::*;
pub use cache::*;
