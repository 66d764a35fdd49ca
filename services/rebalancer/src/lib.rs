//! Zoneshift rebalancer daemon library.
//!
//! The daemon runs a single-writer reconciliation loop against a provider
//! region:
//!
//! ```text
//! SNAPSHOT -> PLAN -> DIFF -> (APPLY) -> SLEEP -> SNAPSHOT ...
//! ```
//!
//! Each cycle rebuilds its state from a fresh provider snapshot; nothing is
//! shared between cycles. Dry-run executes everything up to APPLY and logs
//! the would-be change tree; run-once performs a single cycle and exits.
//!
//! Concurrent copies of the daemon against the same reservation pool would
//! race without coordination. Single-writer operation is an operational
//! constraint, not an enforced one.

// Internal modules exposed for integration tests
pub mod config;
pub mod executor;
pub mod worker;

pub use config::Config;
pub use executor::{ApplyStats, Executor};
pub use worker::RebalanceWorker;
