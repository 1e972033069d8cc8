//! Background loop advancing every subscription's checkpoint.

use crate::service::Notifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one polling cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Chain height seen this tick; `None` when the height query failed and
    /// the tick was skipped.
    pub latest_block: Option<u64>,
    pub blocks_scanned: usize,
    pub transactions_found: usize,
    /// Addresses whose walk stopped early on a failed block fetch.
    pub failed_addresses: Vec<String>,
}

pub struct BlockWatcher {
    notifier: Arc<Notifier>,
    poll_interval: Duration,
}

impl BlockWatcher {
    pub fn new(notifier: Arc<Notifier>, poll_interval: Duration) -> Self {
        // tokio intervals reject a zero period
        Self {
            notifier,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Ticks until `shutdown` is cancelled. Ticks never overlap; a slow tick
    /// delays the next one instead of queueing more.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "Starting block watcher with polling interval {:?}",
            self.poll_interval
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    if report.transactions_found > 0 {
                        info!(
                            "Recorded {} transactions up to block {:?}",
                            report.transactions_found, report.latest_block
                        );
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Shutting down block watcher");
                    break;
                }
            }
        }
    }

    /// One polling cycle over every subscribed address.
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        let latest_block = match self.notifier.get_current_block().await {
            Ok(height) => height,
            Err(e) => {
                warn!("Skipping tick, failed to get current block: {}", e);
                return report;
            }
        };
        report.latest_block = Some(latest_block);

        let checkpoints = self.notifier.checkpoints().await;
        if checkpoints.is_empty() {
            return report;
        }

        for (address, last_checked) in checkpoints {
            if !self
                .walk_address(&address, last_checked, latest_block, &mut report)
                .await
            {
                report.failed_addresses.push(address);
            }
        }

        debug!(
            "Tick at block {}: scanned {} blocks, found {} transactions",
            latest_block, report.blocks_scanned, report.transactions_found
        );
        report
    }

    /// Walks `(last_checked, latest_block]` for one address. Stops at the
    /// first failed fetch so the checkpoint never passes an unchecked block.
    /// Returns false if the walk stopped on a failure.
    async fn walk_address(
        &self,
        address: &str,
        last_checked: u64,
        latest_block: u64,
        report: &mut TickReport,
    ) -> bool {
        for height in last_checked.saturating_add(1)..=latest_block {
            let matches = match self
                .notifier
                .get_transactions_from_block(height, address)
                .await
            {
                Ok(matches) => matches,
                Err(e) => {
                    warn!(
                        "Error fetching transactions for block {} and address {}: {}",
                        height, address, e
                    );
                    return false;
                }
            };

            let found = matches.len();
            if !self.notifier.commit_block(address, height, matches).await {
                // Unsubscribed or re-subscribed mid-tick.
                return true;
            }
            report.blocks_scanned += 1;
            report.transactions_found += found;
        }
        true
    }
}
