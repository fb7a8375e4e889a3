pub mod settings;
pub mod rpc;

pub use settings::*;
pub use rpc::RpcConfig;
