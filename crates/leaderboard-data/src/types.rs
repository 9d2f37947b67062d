//! Wire types for the JSON-RPC 2.0 envelope and `eth_getLogs`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// A single event log as returned by `eth_getLogs`.
///
/// Only `topics` is consumed by the leaderboard; the remaining fields are kept
/// so records can be re-serialized or inspected without loss.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EthLogRecord {
    /// Address of the contract that emitted the log (hex with 0x).
    pub address: String,
    /// Hash of the block containing the log.
    pub block_hash: String,
    /// Block number as a hex quantity.
    pub block_number: String,
    /// Non-indexed log data (hex with 0x prefix).
    pub data: String,
    /// Log index within the block as a hex quantity.
    pub log_index: String,
    /// `true` when the log was removed by a reorg.
    pub removed: bool,
    /// Indexed topics, topic0 first. Each is a hex-encoded 32-byte word.
    pub topics: Vec<String>,
    /// Hash of the transaction that emitted the log.
    pub transaction_hash: String,
    /// Transaction index within the block as a hex quantity.
    pub transaction_index: String,
}

/// Filter object for `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLogsFilter {
    #[serde(rename = "fromBlock", skip_serializing_if = "Option::is_none")]
    pub from_block: Option<String>,
    #[serde(rename = "toBlock", skip_serializing_if = "Option::is_none")]
    pub to_block: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(rename = "blockhash", skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
}

impl GetLogsFilter {
    /// Filter for every log from `from_block` to latest whose topic0 is `topic0`.
    pub fn from_block_with_topic0(from_block: u64, topic0: &str) -> Self {
        Self {
            from_block: Some(format!("0x{from_block:x}")),
            topics: vec![topic0.to_string()],
            ..Default::default()
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

/// A JSON-RPC 2.0 response carrying either `result` or `error`.
#[derive(Clone, Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

impl<T> JsonRpcResponse<T> {
    /// Splits the envelope into the node's result or its error object.
    ///
    /// A response with neither member is reported as a synthetic error with
    /// code 0 so callers never see an empty success.
    pub fn into_result(self) -> Result<T, JsonRpcError> {
        match (self.result, self.error) {
            (_, Some(err)) => Err(err),
            (Some(result), None) => Ok(result),
            (None, None) => Err(JsonRpcError {
                code: 0,
                message: "response carried neither result nor error".to_string(),
                data: None,
            }),
        }
    }
}
