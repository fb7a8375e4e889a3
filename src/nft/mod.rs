pub mod abi;
pub mod collection;

pub use abi::{decode_abi_string, decode_abi_uint};
pub use collection::{infer_token_standard, unique_owners, CollectionScanner};
