//! JSON-RPC envelope handling and decoding of the two ledger calls the
//! notifier makes.

use super::error::LedgerError;
use crate::models::Transaction;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

pub const BLOCK_NUMBER_METHOD: &str = "eth_blockNumber";
pub const BLOCK_BY_NUMBER_METHOD: &str = "eth_getBlockByNumber";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct BlockBody {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Params for fetching a block with full transaction objects.
pub fn block_by_number_params(height: u64) -> Value {
    json!([format!("0x{:x}", height), true])
}

/// Unwraps the `result` of a JSON-RPC envelope.
///
/// A non-zero `error.code` wins over any result that came with it.
pub fn decode_result<T: DeserializeOwned>(method: &str, envelope: Value) -> Result<T, LedgerError> {
    let response: RpcResponse<T> = serde_json::from_value(envelope)
        .map_err(|e| LedgerError::Malformed(format!("{}: {}", method, e)))?;

    if let Some(error) = response.error {
        if error.code != 0 {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
    }

    response
        .result
        .ok_or_else(|| LedgerError::MissingResult(method.to_string()))
}

/// Parses a quantity such as `"0x5ba"`. Strings without a `0x` prefix are
/// read as decimal.
pub fn parse_quantity(raw: &str) -> Result<u64, LedgerError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| LedgerError::Malformed(format!("invalid quantity {:?}: {}", raw, e)))
}

pub fn decode_block_number(envelope: Value) -> Result<u64, LedgerError> {
    let raw: String = decode_result(BLOCK_NUMBER_METHOD, envelope)?;
    parse_quantity(&raw)
}

pub fn decode_block_transactions(envelope: Value) -> Result<Vec<Transaction>, LedgerError> {
    let block: BlockBody = decode_result(BLOCK_BY_NUMBER_METHOD, envelope)?;
    Ok(block.transactions)
}
