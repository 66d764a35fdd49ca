//! Allocation planner: spread the reservation pool across zones to match
//! running demand.
//!
//! Greedy, per key, zones visited in lexicographic order (the zone maps are
//! `BTreeMap`s). The first zone visited draws down the pool first; later
//! zones get a partial or zero allocation once the balance runs out. No
//! fairness guarantee — simplicity over proportionality, and deterministic
//! by construction.

use crate::model::{ReservationPool, ZoneCounts, ZoneDistribution};

/// Compute the desired reservation distribution.
///
/// Guarantees:
/// - a key absent from `pool` is absent from the result (the workload runs
///   unreserved; not an error);
/// - the total assigned per key never exceeds its starting pool balance;
/// - no (key, zone) leaf is assigned more than its running count.
pub fn plan(pool: &ReservationPool, running: &ZoneDistribution) -> ZoneDistribution {
    let mut desired = ZoneDistribution::new();

    for (key, zones) in running.iter() {
        let Some(starting_balance) = pool.get(key) else {
            continue;
        };

        let mut balance = starting_balance;
        let mut assigned = ZoneCounts::new();

        for (zone, &running_count) in zones {
            if balance == 0 {
                break;
            }
            let reserve = balance.min(running_count);
            balance -= reserve;
            assigned.insert(zone.clone(), reserve);
        }

        if !assigned.is_empty() {
            desired.insert(key.clone(), assigned);
        }
    }

    desired
}
