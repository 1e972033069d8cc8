// Configuration for:
// - ledger RPC endpoint URL, timeout and optional rate limit
// - server listening address/port
// - watcher polling interval
// - block cache settings (size, TTL)

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub eth_rpc_url: String,
    pub poll_interval: Duration,
    pub rpc_timeout: Duration,
    pub rpc_rate_limit: Option<u32>,
    pub block_cache_capacity: u64,
    pub block_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            eth_rpc_url: "https://cloudflare-eth.com".to_string(),
            poll_interval: Duration::from_secs(1),
            rpc_timeout: Duration::from_secs(30),
            rpc_rate_limit: None,
            block_cache_capacity: 256,
            block_cache_ttl: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_var("SERVER_PORT").unwrap_or(defaults.server_port);
        let eth_rpc_url = env::var("ETH_RPC_URL").unwrap_or(defaults.eth_rpc_url);
        let poll_interval = parse_var("POLL_INTERVAL_MS")
            .filter(|ms: &u64| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);
        let rpc_timeout = parse_var("RPC_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.rpc_timeout);
        let rpc_rate_limit = parse_var("RPC_RATE_LIMIT").filter(|limit: &u32| *limit > 0);
        let block_cache_capacity =
            parse_var("BLOCK_CACHE_CAPACITY").unwrap_or(defaults.block_cache_capacity);
        let block_cache_ttl = parse_var("BLOCK_CACHE_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.block_cache_ttl);

        Self {
            server_host,
            server_port,
            eth_rpc_url,
            poll_interval,
            rpc_timeout,
            rpc_rate_limit,
            block_cache_capacity,
            block_cache_ttl,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
