//! State classifier: raw provider records → classification buckets.
//!
//! Classification is pure and total. Every record maps to exactly one key;
//! missing or ambiguous fields fall back to the `linux`/`classic` case, so
//! there is no "unclassifiable" outcome and no error path.

use zoneshift_provider::{InstanceRecord, ReservationRecord};

use crate::model::{ClassificationKey, NetworkLocality, Platform, ZoneDistribution};

/// Classify one reservation record. The count contribution is the
/// reservation's instance count.
pub fn classify_reservation(record: &ReservationRecord) -> (ClassificationKey, &str, u64) {
    // Providers encode platform and locality in the free-text description,
    // e.g. "Windows (Amazon VPC)" or "Linux/UNIX".
    let platform = if record.description.contains("Windows") {
        Platform::Windows
    } else {
        Platform::Linux
    };

    let locality = if record.description.contains("Amazon VPC") {
        NetworkLocality::Vpc
    } else {
        NetworkLocality::Classic
    };

    (
        ClassificationKey::new(platform, locality, record.instance_type.clone()),
        &record.availability_zone,
        record.instance_count,
    )
}

/// Classify one running-instance record. Each instance contributes 1.
pub fn classify_instance(record: &InstanceRecord) -> (ClassificationKey, &str, u64) {
    let platform = match &record.platform {
        Some(p) if p.eq_ignore_ascii_case("windows") => Platform::Windows,
        _ => Platform::Linux,
    };

    let locality = match &record.vpc_id {
        Some(id) if !id.is_empty() => NetworkLocality::Vpc,
        _ => NetworkLocality::Classic,
    };

    (
        ClassificationKey::new(platform, locality, record.instance_type.clone()),
        &record.placement_zone,
        1,
    )
}

/// Build the current reservation distribution from active reservations.
pub fn reservation_distribution(records: &[ReservationRecord]) -> ZoneDistribution {
    let mut dist = ZoneDistribution::new();
    for record in records {
        let (key, zone, count) = classify_reservation(record);
        dist.add(key, zone, count);
    }
    dist
}

/// Build the running distribution from running instances.
pub fn running_distribution(records: &[InstanceRecord]) -> ZoneDistribution {
    let mut dist = ZoneDistribution::new();
    for record in records {
        let (key, zone, count) = classify_instance(record);
        dist.add(key, zone, count);
    }
    dist
}
