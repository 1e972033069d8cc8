use super::error::LedgerError;
use crate::config::Config;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// The single call the notifier makes against the ledger.
///
/// Implementations return the raw JSON-RPC envelope; decoding and
/// interpretation of the `error` field are left to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, LedgerError>;
}

/// JSON-RPC over HTTP POST.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl HttpLedgerClient {
    pub fn new(config: &Config) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(config.rpc_timeout)
            .build()?;

        let rate_limiter = config
            .rpc_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_second| RateLimiter::direct(Quota::per_second(per_second)));

        info!(
            "Initializing ledger client with RPC endpoint: {}, timeout: {:?}, rate limit: {:?}",
            config.eth_rpc_url, config.rpc_timeout, config.rpc_rate_limit
        );

        Ok(Self {
            http,
            url: config.eth_rpc_url.clone(),
            next_id: AtomicU64::new(1),
            rate_limiter,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("Sending {} (id {}) to {}", method, id, self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| LedgerError::Malformed(format!("{}: {}", method, e)))
    }
}
