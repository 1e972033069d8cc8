pub mod cache;
pub mod client;
pub mod error;
pub mod rpc;

// Re-exports for convenience
pub use cache::BlockCache;
pub use client::{HttpLedgerClient, LedgerClient};
pub use error::LedgerError;
