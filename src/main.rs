// Initialize configuration
// Set up logging
// Create ledger client and stores
// Start block watcher task
// Start HTTP server

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transaction_notifier::{
    api,
    config::Config,
    ledger::{BlockCache, HttpLedgerClient},
    service::Notifier,
    state::AppState,
    watcher::BlockWatcher,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting transaction-notifier");

    let config = Config::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    let client = Arc::new(HttpLedgerClient::new(&config)?);
    tracing::info!("Watching ledger at {}", client.url());
    let notifier = Arc::new(
        Notifier::in_memory(client).with_block_cache(BlockCache::from_config(&config)),
    );

    let shutdown = CancellationToken::new();

    let watcher = BlockWatcher::new(notifier.clone(), config.poll_interval);
    let watcher_handle = tokio::spawn(watcher.run(shutdown.clone()));
    tracing::info!("Block watcher task started");

    let app_state = Arc::new(AppState { notifier });
    let app = api::create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server is running on http://{}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    let _ = watcher_handle.await;
    Ok(())
}
