//! Diff engine: prune the desired distribution to branches that changed.
//!
//! The diff is shallow on purpose: equality is checked per key over the
//! whole zone-mapping, and a change in any zone surfaces the key's entire
//! desired mapping. That matches the provider's modify semantics, which
//! replace a branch's zone layout atomically rather than patching single
//! zones.

use crate::model::{ChangeTree, ZoneDistribution};

/// Compare current reservation state against the desired distribution.
///
/// The result's keys are always a subset of `desired`'s keys: a key present
/// only in `current` has no desired mapping to emit, so no change is
/// produced for it and its reservations stay where they are.
///
/// An empty result is a trustworthy "no action needed" signal.
pub fn diff(current: &ZoneDistribution, desired: &ZoneDistribution) -> ChangeTree {
    if current == desired {
        return ChangeTree::default();
    }

    let mut result = desired.clone();

    for (key, zones) in current.iter() {
        if desired.get(key) == Some(zones) {
            result.remove(key);
        }
    }

    ChangeTree::new(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassificationKey, NetworkLocality, Platform};

    fn key(platform: Platform, shape: &str) -> ClassificationKey {
        ClassificationKey::new(platform, NetworkLocality::Classic, shape)
    }

    fn dist(entries: &[(&ClassificationKey, &[(&str, u64)])]) -> ZoneDistribution {
        let mut d = ZoneDistribution::new();
        for (k, zones) in entries {
            for (zone, count) in *zones {
                d.add((*k).clone(), *zone, *count);
            }
        }
        d
    }

    #[test]
    fn identical_trees_diff_to_empty() {
        let k = key(Platform::Linux, "m4.large");
        let current = dist(&[(&k, &[("us-east-1a", 4), ("us-east-1b", 6)])]);

        assert!(diff(&current, &current.clone()).is_empty());
        assert!(diff(&ZoneDistribution::new(), &ZoneDistribution::new()).is_empty());
    }

    #[test]
    fn single_zone_change_surfaces_whole_branch() {
        let k = key(Platform::Linux, "m4.large");
        let current = dist(&[(&k, &[("us-east-1a", 4), ("us-east-1b", 9)])]);
        let desired = dist(&[(&k, &[("us-east-1a", 4), ("us-east-1b", 6)])]);

        let changes = diff(&current, &desired);
        assert_eq!(changes.len(), 1);

        // The unchanged us-east-1a leaf rides along with the changed one.
        let zones = changes.get(&k).unwrap();
        assert_eq!(zones.get("us-east-1a"), Some(&4));
        assert_eq!(zones.get("us-east-1b"), Some(&6));
    }

    #[test]
    fn unchanged_branches_are_pruned() {
        let changed = key(Platform::Linux, "m4.large");
        let stable = key(Platform::Windows, "c4.xlarge");

        let current = dist(&[
            (&changed, &[("us-east-1a", 5)]),
            (&stable, &[("us-east-1b", 2)]),
        ]);
        let desired = dist(&[
            (&changed, &[("us-east-1b", 5)]),
            (&stable, &[("us-east-1b", 2)]),
        ]);

        let changes = diff(&current, &desired);
        assert_eq!(changes.len(), 1);
        assert!(changes.get(&changed).is_some());
        assert!(changes.get(&stable).is_none());
    }

    #[test]
    fn key_only_in_desired_is_kept() {
        let k = key(Platform::Linux, "m4.large");
        let desired = dist(&[(&k, &[("us-east-1a", 3)])]);

        let changes = diff(&ZoneDistribution::new(), &desired);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get(&k).unwrap().get("us-east-1a"), Some(&3));
    }

    #[test]
    fn key_only_in_current_produces_no_change() {
        // A platform that vanished from desired state: no branch is emitted,
        // its reservations are left pinned where they are.
        let vanished = key(Platform::Windows, "c4.xlarge");
        let active = key(Platform::Linux, "m4.large");

        let current = dist(&[
            (&vanished, &[("us-east-1a", 2)]),
            (&active, &[("us-east-1a", 5)]),
        ]);
        let desired = dist(&[(&active, &[("us-east-1b", 5)])]);

        let changes = diff(&current, &desired);
        assert_eq!(changes.len(), 1);
        assert!(changes.get(&vanished).is_none());
        assert!(changes.get(&active).is_some());
    }

    #[test]
    fn zone_set_difference_is_a_change() {
        // Same totals, different zones: structural equality must fail.
        let k = key(Platform::Linux, "m4.large");
        let current = dist(&[(&k, &[("us-east-1a", 5)])]);
        let desired = dist(&[(&k, &[("us-east-1b", 5)])]);

        assert_eq!(diff(&current, &desired).len(), 1);
    }
}
