//! Subscription checkpoint store

use super::{Storage, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Maps an address to the last block height checked for it.
#[derive(Default)]
pub struct SubscriptionStore {
    checkpoints: RwLock<HashMap<String, u64>>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage<u64> for SubscriptionStore {
    /// Insert or overwrite the checkpoint
    async fn save(&self, key: &str, value: u64) {
        self.checkpoints.write().await.insert(key.to_string(), value);
        debug!("Saved checkpoint {} = {}", key, value);
    }

    async fn find(&self, key: &str) -> Option<u64> {
        self.checkpoints.read().await.get(key).copied()
    }

    /// Never creates a key, so a deleted subscription cannot be revived by a
    /// late checkpoint write.
    async fn update(&self, key: &str, value: u64) -> bool {
        let mut checkpoints = self.checkpoints.write().await;
        match checkpoints.get_mut(key) {
            Some(checkpoint) => {
                *checkpoint = value;
                debug!("Advanced checkpoint {} = {}", key, value);
                true
            }
            None => false,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.checkpoints
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn get_all(&self) -> HashMap<String, u64> {
        self.checkpoints.read().await.clone()
    }
}
