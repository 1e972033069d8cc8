//! Concurrency-safe keyed storage for subscriptions and transaction logs.

pub mod subscription;
pub mod transaction;

pub use subscription::SubscriptionStore;
pub use transaction::TransactionStore;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("No entry found for key {0}")]
    NotFound(String),
}

/// Keyed storage capability consumed by the notifier.
///
/// Any backing implementation must allow concurrent readers, exclude writers
/// from readers, and hand out snapshots from [`Storage::get_all`] that are not
/// affected by later mutation.
#[async_trait]
pub trait Storage<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Stores `value` under `key`. Whether this overwrites or accumulates is
    /// defined by the implementation.
    async fn save(&self, key: &str, value: V);

    async fn find(&self, key: &str) -> Option<V>;

    /// Replaces the value only if `key` already exists. Returns whether the
    /// entry was replaced.
    async fn update(&self, key: &str, value: V) -> bool;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Snapshot copy of every entry.
    async fn get_all(&self) -> HashMap<String, V>;
}
