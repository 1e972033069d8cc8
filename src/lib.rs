pub mod api;
pub mod config;
pub mod ledger;
pub mod models;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;
pub mod watcher;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::{create_router, AddressQuery, SubscribeRequest};
pub use ledger::{HttpLedgerClient, LedgerClient, LedgerError};
pub use models::{Subscription, Transaction};
pub use service::{Notifier, NotifierError};
pub use store::{Storage, StorageError, SubscriptionStore, TransactionStore};
pub use validation::{normalize_address, validate_address};
pub use watcher::{BlockWatcher, TickReport};
