//! Configuration for the rebalancer daemon.
//!
//! Flags resolve from the command line first, then environment variables.
//! Credentials are env-only so they never appear in process listings.

use anyhow::{bail, Result};
use clap::Parser;
use zoneshift_provider::ProviderCredentials;

/// Rebalance zonal capacity reservations to match running instances.
#[derive(Debug, Parser)]
#[command(name = "zoneshiftd", version, about)]
pub struct Args {
    /// Provider region to reconcile.
    #[arg(long, env = "ZONESHIFT_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Provider API endpoint.
    #[arg(
        long,
        env = "ZONESHIFT_PROVIDER_URL",
        default_value = "https://api.provider.local"
    )]
    pub provider_url: String,

    /// Seconds between reconciliation cycles.
    #[arg(long, env = "ZONESHIFT_CHECK_INTERVAL", default_value_t = 3600)]
    pub check_interval: u64,

    /// Compute and log the change tree without modifying any reservation.
    #[arg(long, env = "ZONESHIFT_DRY_RUN")]
    pub dry_run: bool,

    /// Run a single reconciliation cycle and exit.
    #[arg(long, env = "ZONESHIFT_RUN_ONCE")]
    pub run_once: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "ZONESHIFT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub provider_url: String,
    pub check_interval_secs: u64,
    pub dry_run: bool,
    pub run_once: bool,
    pub log_level: String,
    pub credentials: Option<ProviderCredentials>,
}

impl Config {
    /// Resolve configuration from parsed arguments and the environment.
    pub fn from_args(args: Args) -> Result<Self> {
        if args.check_interval == 0 {
            bail!("check interval must be greater than zero");
        }

        let credentials = match (
            std::env::var("ZONESHIFT_ACCESS_KEY_ID").ok(),
            std::env::var("ZONESHIFT_SECRET_ACCESS_KEY").ok(),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(ProviderCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => bail!(
                "ZONESHIFT_ACCESS_KEY_ID and ZONESHIFT_SECRET_ACCESS_KEY must be set together"
            ),
        };

        Ok(Self {
            region: args.region,
            provider_url: args.provider_url,
            check_interval_secs: args.check_interval,
            dry_run: args.dry_run,
            run_once: args.run_once,
            log_level: args.log_level,
            credentials,
        })
    }
}
