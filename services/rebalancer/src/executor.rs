//! Reconciliation executor: turn a change tree into provider modify calls.
//!
//! One atomic modify call per (platform, locality, shape) branch. Branch
//! outcomes are independent: a failed call is logged and counted, the rest
//! proceed, and no rollback is attempted. Recovery for a partially applied
//! tree is the next cycle's fresh diff.

use chrono::Utc;
use tracing::{info, warn};

use zoneshift_core::{ChangeTree, ClassificationKey, ZoneCounts};
use zoneshift_provider::{ProviderGateway, ReservationRecord, TargetConfiguration};

/// Outcome of one apply pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyStats {
    pub branches_applied: u32,
    pub branches_failed: u32,
}

impl ApplyStats {
    /// True when at least one branch failed while others may have succeeded.
    pub fn is_partial_failure(&self) -> bool {
        self.branches_failed > 0
    }
}

/// Applies change trees through a provider gateway.
pub struct Executor<'a, G: ProviderGateway> {
    gateway: &'a G,
}

impl<'a, G: ProviderGateway> Executor<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Apply every branch of the change tree.
    ///
    /// The active reservation list is fetched once and reused for all
    /// branches. A failure to fetch it aborts the pass entirely (no branch
    /// has been submitted yet); per-branch modify failures do not.
    pub async fn apply(&self, changes: &ChangeTree) -> Result<ApplyStats, zoneshift_provider::ProviderError> {
        let mut stats = ApplyStats::default();

        if changes.is_empty() {
            return Ok(stats);
        }

        let reservations = self.gateway.list_active_reservations().await?;

        for (key, zones) in changes.iter() {
            let reservation_ids = matching_reservation_ids(&reservations, key);
            let targets = branch_targets(key, zones);
            let token = client_token(key);

            match self
                .gateway
                .modify_reservations(&token, &reservation_ids, &targets)
                .await
            {
                Ok(()) => {
                    info!(
                        platform = %key.platform,
                        locality = %key.locality,
                        instance_type = %key.shape,
                        reservation_count = reservation_ids.len(),
                        client_token = %token,
                        "Reservation branch modified"
                    );
                    stats.branches_applied += 1;
                }
                Err(e) => {
                    warn!(
                        platform = %key.platform,
                        locality = %key.locality,
                        instance_type = %key.shape,
                        error = %e,
                        "Failed to modify reservation branch"
                    );
                    stats.branches_failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// Reservations belonging to a branch: description contains the platform
/// name (case-insensitive) and the instance type matches the shape.
///
/// The description-substring rule is inherited from the original tool and
/// unverified against real provider description formats; it lives here so a
/// confirmed matching rule replaces exactly one function.
fn matching_reservation_ids(
    reservations: &[ReservationRecord],
    key: &ClassificationKey,
) -> Vec<String> {
    reservations
        .iter()
        .filter(|r| {
            r.description.to_lowercase().contains(key.platform.as_str())
                && r.instance_type == key.shape
        })
        .map(|r| r.id.clone())
        .collect()
}

/// One target configuration per leaf of the branch.
fn branch_targets(key: &ClassificationKey, zones: &ZoneCounts) -> Vec<TargetConfiguration> {
    zones
        .iter()
        .map(|(zone, &count)| TargetConfiguration {
            availability_zone: zone.clone(),
            locality_label: key.locality.provider_label().to_string(),
            instance_type: key.shape.clone(),
            instance_count: count,
        })
        .collect()
}

/// Client token for one submission: locality, shape, and timestamp, so
/// retries are distinguishable but never deduplicated by the provider.
fn client_token(key: &ClassificationKey) -> String {
    format!(
        "zoneshift-{}-{}-{}",
        key.locality,
        key.shape,
        Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoneshift_core::{NetworkLocality, Platform};

    fn reservation(id: &str, description: &str, instance_type: &str) -> ReservationRecord {
        ReservationRecord {
            id: id.to_string(),
            description: description.to_string(),
            instance_type: instance_type.to_string(),
            availability_zone: "us-east-1a".to_string(),
            instance_count: 1,
        }
    }

    #[test]
    fn matching_filters_by_description_and_shape() {
        let key = ClassificationKey::new(Platform::Windows, NetworkLocality::Vpc, "m4.large");
        let reservations = vec![
            reservation("res-1", "Windows (Amazon VPC)", "m4.large"),
            reservation("res-2", "Windows (Amazon VPC)", "c4.xlarge"),
            reservation("res-3", "Linux/UNIX", "m4.large"),
        ];

        let ids = matching_reservation_ids(&reservations, &key);
        assert_eq!(ids, vec!["res-1"]);
    }

    #[test]
    fn branch_targets_carry_provider_locality_label() {
        let key = ClassificationKey::new(Platform::Linux, NetworkLocality::Vpc, "m4.large");
        let mut zones = ZoneCounts::new();
        zones.insert("us-east-1a".to_string(), 4);
        zones.insert("us-east-1b".to_string(), 6);

        let targets = branch_targets(&key, &zones);
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.locality_label == "EC2-VPC"));
        assert!(targets.iter().all(|t| t.instance_type == "m4.large"));
        assert_eq!(targets[0].availability_zone, "us-east-1a");
        assert_eq!(targets[0].instance_count, 4);
    }

    #[test]
    fn client_token_encodes_locality_and_shape() {
        let key = ClassificationKey::new(Platform::Linux, NetworkLocality::Classic, "m4.large");
        let token = client_token(&key);
        assert!(token.starts_with("zoneshift-classic-m4.large-"));
    }
}
