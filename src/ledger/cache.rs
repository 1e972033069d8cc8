//! Block body cache implementation using Moka

use crate::config::Config;
use crate::models::Transaction;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Caches the full transaction list of fetched blocks by height.
///
/// Every subscribed address walks the same heights, so within one tick a block
/// only goes over the wire once. Entries are never address-specific.
#[derive(Clone)]
pub struct BlockCache {
    cache: Cache<u64, Arc<Vec<Transaction>>>,
}

impl BlockCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.block_cache_capacity, config.block_cache_ttl)
    }

    pub async fn get(&self, height: u64) -> Option<Arc<Vec<Transaction>>> {
        let result = self.cache.get(&height).await;
        if result.is_some() {
            debug!("Block cache hit for height {}", height);
        }
        result
    }

    pub async fn insert(&self, height: u64, transactions: Arc<Vec<Transaction>>) {
        self.cache.insert(height, transactions).await;
        debug!("Cached block {}", height);
    }
}
