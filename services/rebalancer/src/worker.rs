//! Reconciliation loop: snapshot, plan, diff, apply, sleep.
//!
//! One cycle is strictly sequential and nothing carries over between
//! cycles. A provider error during the snapshot is fatal: the loop logs and
//! returns it, the process exits non-zero, and an external supervisor is
//! expected to restart it. Per-branch apply failures are not fatal; the next
//! cycle's fresh diff re-attempts whatever is still outstanding.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use zoneshift_core::{
    diff, plan, reservation_distribution, running_distribution, ChangeTree, ReservationPool,
};
use zoneshift_provider::{ProviderError, ProviderGateway};

use crate::config::Config;
use crate::executor::{ApplyStats, Executor};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleStats {
    pub branches_changed: u32,
    pub apply: ApplyStats,
}

/// The reconciliation loop driver.
pub struct RebalanceWorker<G: ProviderGateway> {
    gateway: G,
    config: Config,
}

impl<G: ProviderGateway> RebalanceWorker<G> {
    pub fn new(gateway: G, config: Config) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Run the loop until shutdown, a fatal provider error, or — in
    /// run-once mode — the end of the first cycle.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), ProviderError> {
        info!(
            region = %self.config.region,
            check_interval_secs = self.config.check_interval_secs,
            dry_run = self.config.dry_run,
            run_once = self.config.run_once,
            "Starting rebalance loop"
        );

        loop {
            self.run_cycle().await?;

            if self.config.run_once {
                return Ok(());
            }

            debug!(
                seconds = self.config.check_interval_secs,
                "Sleeping until next check"
            );
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(self.config.check_interval_secs)) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Rebalance loop shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// SNAPSHOT -> PLAN -> DIFF -> log -> (APPLY).
    pub async fn run_cycle(&self) -> Result<CycleStats, ProviderError> {
        let reservations = self.gateway.list_active_reservations().await?;
        let instances = self.gateway.list_running_instances().await?;

        let current = reservation_distribution(&reservations);
        let pool = ReservationPool::from_distribution(&current);
        let running = running_distribution(&instances);

        let desired = plan(&pool, &running);
        let changes = diff(&current, &desired);

        let mut stats = CycleStats {
            branches_changed: changes.len() as u32,
            ..CycleStats::default()
        };

        if changes.is_empty() {
            debug!("No changes needed");
            return Ok(stats);
        }

        log_change_tree(&changes);

        if self.config.dry_run {
            info!(
                branches = changes.len(),
                "Dry run, skipping reservation modification"
            );
            return Ok(stats);
        }

        stats.apply = Executor::new(&self.gateway).apply(&changes).await?;
        if stats.apply.is_partial_failure() {
            warn!(
                branches_applied = stats.apply.branches_applied,
                branches_failed = stats.apply.branches_failed,
                "Change tree partially applied; next cycle will retry the remainder"
            );
        }

        Ok(stats)
    }
}

/// One line per branch:
/// `platform=<p> locality=<l> instance_type=<t> -> zone:count[; zone:count...]`
fn log_change_tree(changes: &ChangeTree) {
    for (key, zones) in changes.iter() {
        let members = zones
            .iter()
            .map(|(zone, count)| format!("{zone}:{count}"))
            .collect::<Vec<_>>()
            .join("; ");
        info!(
            "platform={} locality={} instance_type={} -> {}",
            key.platform, key.locality, key.shape, members
        );
    }
}
