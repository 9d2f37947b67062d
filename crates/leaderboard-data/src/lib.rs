//! leaderboard-data crate
//!
//! JSON-RPC wire types and the HTTP client used to pull ERC-20 Transfer
//! logs from an Ethereum node.

pub mod rpc;
pub mod types;

pub use rpc::{from_block_for_depth, RpcClient, TransportConfig};
pub use types::{EthLogRecord, GetLogsFilter, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
