//! Core reconciliation logic for availability-zone reservation rebalancing.
//!
//! This crate is pure computation over a fresh provider snapshot:
//!
//! - **Classifier** ([`classify`]): raw reservation/instance records →
//!   (platform, network locality, instance shape) buckets per zone.
//! - **Planner** ([`planner`]): redistributes the fungible reservation pool
//!   across zones to match current running demand.
//! - **Diff engine** ([`diff`]): prunes the desired tree down to the
//!   branches that actually differ from current reservation state.
//!
//! # Invariants
//!
//! - Counts are non-negative; a key with zero pool total is never allocated.
//! - A (key, zone) assignment never exceeds the remaining pool balance nor
//!   the zone's running-instance count.
//! - Every branch in a change tree differs from the current state.
//! - All structures are rebuilt from scratch each cycle; nothing persists.

pub mod classify;
pub mod diff;
pub mod model;
pub mod planner;

pub use classify::{reservation_distribution, running_distribution};
pub use diff::diff;
pub use model::{
    ChangeTree, ClassificationKey, NetworkLocality, Platform, ReservationPool, ZoneCounts,
    ZoneDistribution,
};
pub use planner::plan;
