//! Crate-level tests driving the notifier, watcher and HTTP surface against a
//! scripted in-memory ledger.

mod api_tests;

use crate::{
    ledger::{rpc, LedgerClient, LedgerError},
    models::Transaction,
    service::Notifier,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const ADDRESS_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const ADDRESS_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const OTHER: &str = "0x9999999999999999999999999999999999999999";

#[derive(Default)]
struct LedgerState {
    height: u64,
    height_unavailable: bool,
    blocks: HashMap<u64, Vec<Transaction>>,
    failing_blocks: HashSet<u64>,
    withheld_blocks: HashSet<u64>,
    block_requests: Vec<u64>,
}

/// Ledger whose chain height, block contents and failures are set by the test.
#[derive(Default)]
pub struct ScriptedLedger {
    state: Mutex<LedgerState>,
}

impl ScriptedLedger {
    pub fn at_height(height: u64) -> Arc<Self> {
        let ledger = Self::default();
        ledger.set_height(height);
        Arc::new(ledger)
    }

    pub fn set_height(&self, height: u64) {
        self.state.lock().unwrap().height = height;
    }

    pub fn set_height_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().height_unavailable = unavailable;
    }

    pub fn add_transaction(&self, height: u64, tx: Transaction) {
        self.state
            .lock()
            .unwrap()
            .blocks
            .entry(height)
            .or_default()
            .push(tx);
    }

    pub fn fail_block(&self, height: u64) {
        self.state.lock().unwrap().failing_blocks.insert(height);
    }

    pub fn heal_block(&self, height: u64) {
        self.state.lock().unwrap().failing_blocks.remove(&height);
    }

    /// Block answers with a null result, as a lagging node would.
    pub fn withhold_block(&self, height: u64) {
        self.state.lock().unwrap().withheld_blocks.insert(height);
    }

    pub fn release_block(&self, height: u64) {
        self.state.lock().unwrap().withheld_blocks.remove(&height);
    }

    pub fn block_requests(&self) -> Vec<u64> {
        self.state.lock().unwrap().block_requests.clone()
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let mut state = self.state.lock().unwrap();
        match method {
            rpc::BLOCK_NUMBER_METHOD => {
                if state.height_unavailable {
                    return Err(LedgerError::Transport("connection refused".to_string()));
                }
                Ok(json!({"jsonrpc": "2.0", "id": 1, "result": format!("0x{:x}", state.height)}))
            }
            rpc::BLOCK_BY_NUMBER_METHOD => {
                let height = params[0]
                    .as_str()
                    .and_then(|raw| rpc::parse_quantity(raw).ok())
                    .expect("block height param");
                state.block_requests.push(height);

                if state.failing_blocks.contains(&height) {
                    return Err(LedgerError::Transport("timed out".to_string()));
                }
                if height > state.height || state.withheld_blocks.contains(&height) {
                    return Ok(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
                }
                let transactions = state.blocks.get(&height).cloned().unwrap_or_default();
                Ok(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {"number": format!("0x{:x}", height), "transactions": transactions}
                }))
            }
            other => Ok(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32601, "message": format!("method {} not found", other)}
            })),
        }
    }
}

pub fn notifier_for(ledger: &Arc<ScriptedLedger>) -> Arc<Notifier> {
    Arc::new(Notifier::in_memory(ledger.clone()))
}

pub fn transfer(from: &str, to: &str, hash: &str) -> Transaction {
    Transaction::new(from, to, "0xde0b6b3a7640000", hash)
}
