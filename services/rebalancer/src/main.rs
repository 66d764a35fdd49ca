//! zoneshiftd - availability-zone reservation rebalancer.
//!
//! Snapshots reservation and running-instance state from the provider,
//! plans a zone distribution that covers running demand from the existing
//! reservation pool, and applies only the branches that changed.

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zoneshift_provider::HttpGateway;
use zoneshift_rebalancer::config::{Args, Config};
use zoneshift_rebalancer::worker::RebalanceWorker;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        region = %config.region,
        provider_url = %config.provider_url,
        dry_run = config.dry_run,
        run_once = config.run_once,
        "Configuration loaded"
    );

    let gateway = HttpGateway::new(
        &config.provider_url,
        &config.region,
        config.credentials.as_ref(),
    )?;

    // Interrupt between cycles; an in-flight apply is not aborted.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    let worker = RebalanceWorker::new(gateway, config);
    if let Err(e) = worker.run(shutdown_rx).await {
        error!(error = %e, "Rebalance loop terminated");
        return Err(e.into());
    }

    Ok(())
}
