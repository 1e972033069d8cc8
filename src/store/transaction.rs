//! Transaction log store

use super::{Storage, StorageError};
use crate::models::Transaction;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Maps an address to the transactions observed for it, in discovery order.
#[derive(Default)]
pub struct TransactionStore {
    logs: RwLock<HashMap<String, Vec<Transaction>>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage<Vec<Transaction>> for TransactionStore {
    /// Appends to the existing log; repeated saves accumulate history.
    async fn save(&self, key: &str, value: Vec<Transaction>) {
        let mut logs = self.logs.write().await;
        let log = logs.entry(key.to_string()).or_default();
        log.extend(value);
        debug!("Transaction log for {} now holds {} entries", key, log.len());
    }

    async fn find(&self, key: &str) -> Option<Vec<Transaction>> {
        self.logs.read().await.get(key).cloned()
    }

    async fn update(&self, key: &str, value: Vec<Transaction>) -> bool {
        let mut logs = self.logs.write().await;
        match logs.get_mut(key) {
            Some(log) => {
                *log = value;
                true
            }
            None => false,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.logs
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn get_all(&self) -> HashMap<String, Vec<Transaction>> {
        self.logs.read().await.clone()
    }
}
