//! JSON-RPC message shapes for the random.org v4 API
//!
//! Only the two methods the feed needs are modelled: `generateIntegers` and
//! `getUsage`. Responses carry either a `result` or an `error` object.
//!
//! # Example exchange
//!
//! ```text
//! -> {"jsonrpc":"2.0","method":"generateIntegers","params":{"apiKey":"...","n":20,"min":1,"max":7,"replacement":true},"id":1}
//! <- {"jsonrpc":"2.0","result":{"random":{"data":[3,1,7,...],"completionTime":"..."},"bitsUsed":57,"bitsLeft":249943,"requestsLeft":999,"advisoryDelay":20},"id":1}
//! ```

use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";

pub const METHOD_GENERATE_INTEGERS: &str = "generateIntegers";
pub const METHOD_GET_USAGE: &str = "getUsage";

/// Request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: u64,
}

impl<P: Serialize> RpcRequest<P> {
    pub fn new(method: &'static str, params: P, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateIntegersParams<'a> {
    pub api_key: &'a str,
    pub n: usize,
    pub min: i64,
    pub max: i64,
    pub replacement: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageParams<'a> {
    pub api_key: &'a str,
}

/// Response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<R> {
    pub result: Option<R>,
    pub error: Option<RpcError>,
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateIntegersResult {
    pub random: RandomData,
    #[serde(default)]
    pub bits_left: Option<i64>,
    #[serde(default)]
    pub requests_left: Option<i64>,
    /// Milliseconds the provider asks clients to wait before the next request.
    #[serde(default)]
    pub advisory_delay: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomData {
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResult {
    #[serde(default)]
    pub status: Option<String>,
    pub bits_left: i64,
    #[serde(default)]
    pub requests_left: Option<i64>,
}
