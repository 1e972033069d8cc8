use super::error::NotifierError;
use crate::ledger::{rpc, BlockCache, LedgerClient, LedgerError};
use crate::models::{Subscription, Transaction};
use crate::store::{Storage, StorageError, SubscriptionStore, TransactionStore};
use crate::validation::normalize_address;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub type SubscriptionStorage = Arc<dyn Storage<u64>>;
pub type TransactionStorage = Arc<dyn Storage<Vec<Transaction>>>;

/// Orchestrates subscriptions and transaction retrieval against the two
/// stores, and applies the block watcher's progress.
///
/// Addresses are normalised before they are used as store keys, so
/// `0xABC..` and `0xabc..` name the same subscription.
pub struct Notifier {
    client: Arc<dyn LedgerClient>,
    subscriptions: SubscriptionStorage,
    transactions: TransactionStorage,
    block_cache: Option<BlockCache>,
    /// Keeps check-then-act sequences atomic across callers and the watcher.
    lock: Mutex<()>,
}

impl Notifier {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        subscriptions: SubscriptionStorage,
        transactions: TransactionStorage,
    ) -> Self {
        Self {
            client,
            subscriptions,
            transactions,
            block_cache: None,
            lock: Mutex::new(()),
        }
    }

    /// Notifier backed by fresh in-memory stores.
    pub fn in_memory(client: Arc<dyn LedgerClient>) -> Self {
        Self::new(
            client,
            Arc::new(SubscriptionStore::new()),
            Arc::new(TransactionStore::new()),
        )
    }

    pub fn with_block_cache(mut self, cache: BlockCache) -> Self {
        self.block_cache = Some(cache);
        self
    }

    /// Current chain height as reported by the ledger.
    pub async fn get_current_block(&self) -> Result<u64, LedgerError> {
        let envelope = self
            .client
            .send_request(rpc::BLOCK_NUMBER_METHOD, json!([]))
            .await?;
        rpc::decode_block_number(envelope)
    }

    /// Starts watching `address` from the current chain height.
    ///
    /// Returns `Ok(false)` without contacting the ledger when the address is
    /// already subscribed. Nothing is stored if the height is unavailable.
    pub async fn subscribe(&self, address: &str) -> Result<bool, NotifierError> {
        let key = normalize_address(address);

        if self.subscriptions.find(&key).await.is_some() {
            debug!("Address {} is already subscribed", key);
            return Ok(false);
        }

        // The height query runs outside the lock; a concurrent subscribe may
        // win the race, so membership is checked again once it is held.
        let start_block = self.get_current_block().await?;
        let _guard = self.lock.lock().await;

        if self.subscriptions.find(&key).await.is_some() {
            debug!("Address {} was subscribed concurrently", key);
            return Ok(false);
        }

        self.subscriptions.save(&key, start_block).await;
        info!("Subscribed {} at block {}", key, start_block);
        Ok(true)
    }

    /// Removes the subscription. The transaction log is kept.
    pub async fn unsubscribe(&self, address: &str) -> Result<(), NotifierError> {
        let key = normalize_address(address);
        let _guard = self.lock.lock().await;

        self.subscriptions
            .delete(&key)
            .await
            .map_err(|StorageError::NotFound(key)| NotifierError::NotSubscribed(key))?;
        info!("Unsubscribed {}", key);
        Ok(())
    }

    pub async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, NotifierError> {
        let key = normalize_address(address);
        let _guard = self.lock.lock().await;

        if let Some(transactions) = self.transactions.find(&key).await {
            return Ok(transactions);
        }

        if self.subscriptions.find(&key).await.is_some() {
            Err(NotifierError::NoTransactions(key))
        } else {
            Err(NotifierError::NotSubscribed(key))
        }
    }

    /// Clears the transaction log, leaving the checkpoint untouched.
    pub async fn clean_up_transactions(&self, address: &str) -> Result<(), NotifierError> {
        let key = normalize_address(address);
        let _guard = self.lock.lock().await;

        self.transactions
            .delete(&key)
            .await
            .map_err(|StorageError::NotFound(key)| NotifierError::NoTransactions(key))?;
        info!("Cleaned up transactions for {}", key);
        Ok(())
    }

    /// Fetches block `height` and keeps the transactions sent from or to
    /// `address`, in block order.
    pub async fn get_transactions_from_block(
        &self,
        height: u64,
        address: &str,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let address = address.trim();
        let block = self.fetch_block(height).await?;
        Ok(block
            .iter()
            .filter(|tx| tx.involves(address))
            .cloned()
            .collect())
    }

    pub async fn checkpoint(&self, address: &str) -> Option<u64> {
        self.subscriptions.find(&normalize_address(address)).await
    }

    /// Snapshot of every subscription, ordered by address.
    pub async fn subscriptions(&self) -> Vec<Subscription> {
        let mut subscriptions: Vec<_> = self
            .subscriptions
            .get_all()
            .await
            .into_iter()
            .map(|(address, last_checked_block)| Subscription {
                address,
                last_checked_block,
            })
            .collect();
        subscriptions.sort_by(|a, b| a.address.cmp(&b.address));
        subscriptions
    }

    pub(crate) async fn checkpoints(&self) -> HashMap<String, u64> {
        self.subscriptions.get_all().await
    }

    /// Records block `height` as checked for `address`, appending `matches`.
    ///
    /// Applied only when `height` directly follows the stored checkpoint, so a
    /// block is never ingested twice and none is skipped. Returns false when
    /// the address is gone or the checkpoint has moved on.
    pub(crate) async fn commit_block(
        &self,
        address: &str,
        height: u64,
        matches: Vec<Transaction>,
    ) -> bool {
        let _guard = self.lock.lock().await;

        match self.subscriptions.find(address).await {
            Some(checkpoint) if checkpoint.checked_add(1) == Some(height) => {}
            Some(checkpoint) => {
                debug!(
                    "Skipping block {} for {}: checkpoint is {}",
                    height, address, checkpoint
                );
                return false;
            }
            None => {
                debug!("Skipping block {} for {}: no longer subscribed", height, address);
                return false;
            }
        }

        if !matches.is_empty() {
            debug!(
                "Recording {} transactions for {} at block {}",
                matches.len(),
                address,
                height
            );
            self.transactions.save(address, matches).await;
        }
        self.subscriptions.update(address, height).await
    }

    async fn fetch_block(&self, height: u64) -> Result<Arc<Vec<Transaction>>, LedgerError> {
        if let Some(cache) = &self.block_cache {
            if let Some(block) = cache.get(height).await {
                return Ok(block);
            }
        }

        let envelope = self
            .client
            .send_request(rpc::BLOCK_BY_NUMBER_METHOD, rpc::block_by_number_params(height))
            .await?;
        let block = Arc::new(rpc::decode_block_transactions(envelope)?);

        if let Some(cache) = &self.block_cache {
            cache.insert(height, block.clone()).await;
        }
        Ok(block)
    }
}
