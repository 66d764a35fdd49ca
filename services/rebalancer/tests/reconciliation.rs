//! End-to-end reconciliation cycles against the mock gateway.

use zoneshift_provider::{InstanceRecord, MockGateway, ReservationRecord};
use zoneshift_rebalancer::{Config, RebalanceWorker};

fn config(dry_run: bool) -> Config {
    Config {
        region: "us-east-1".to_string(),
        provider_url: "http://localhost:0".to_string(),
        check_interval_secs: 3600,
        dry_run,
        run_once: true,
        log_level: "debug".to_string(),
        credentials: None,
    }
}

fn linux_reservation(id: &str, zone: &str, count: u64) -> ReservationRecord {
    ReservationRecord {
        id: id.to_string(),
        description: "Linux/UNIX".to_string(),
        instance_type: "m4.large".to_string(),
        availability_zone: zone.to_string(),
        instance_count: count,
    }
}

fn linux_instance(zone: &str) -> InstanceRecord {
    InstanceRecord {
        instance_type: "m4.large".to_string(),
        placement_zone: zone.to_string(),
        vpc_id: None,
        platform: None,
    }
}

/// Reservations pinned to us-east-1a while all workloads run in us-east-1b:
/// one branch should move, with one modify call replacing the zone layout.
#[tokio::test]
async fn drifted_reservations_produce_one_modify_per_branch() {
    let gateway = MockGateway::new()
        .with_reservations(vec![linux_reservation("res-1", "us-east-1a", 3)])
        .with_instances(vec![
            linux_instance("us-east-1b"),
            linux_instance("us-east-1b"),
            linux_instance("us-east-1b"),
        ]);

    let worker = RebalanceWorker::new(gateway, config(false));
    let stats = worker.run_cycle().await.unwrap();

    assert_eq!(stats.branches_changed, 1);
    assert_eq!(stats.apply.branches_applied, 1);
    assert_eq!(stats.apply.branches_failed, 0);
}

#[tokio::test]
async fn modify_call_targets_the_new_zone_layout() {
    let gateway = MockGateway::new()
        .with_reservations(vec![linux_reservation("res-1", "us-east-1a", 2)])
        .with_instances(vec![linux_instance("us-east-1b"), linux_instance("us-east-1b")]);

    let worker = RebalanceWorker::new(gateway, config(false));
    worker.run_cycle().await.unwrap();

    let calls = worker.gateway().recorded_modifies();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].reservation_ids, vec!["res-1"]);
    assert!(calls[0].client_token.starts_with("zoneshift-classic-m4.large-"));
    assert_eq!(calls[0].targets.len(), 1);
    assert_eq!(calls[0].targets[0].availability_zone, "us-east-1b");
    assert_eq!(calls[0].targets[0].instance_count, 2);
    assert_eq!(calls[0].targets[0].locality_label, "EC2-Classic");
}

/// Current already equals desired: no modify call, empty diff.
#[tokio::test]
async fn converged_state_issues_no_calls() {
    let gateway = MockGateway::new()
        .with_reservations(vec![linux_reservation("res-1", "us-east-1a", 2)])
        .with_instances(vec![linux_instance("us-east-1a"), linux_instance("us-east-1a")]);

    let worker = RebalanceWorker::new(gateway, config(false));
    let stats = worker.run_cycle().await.unwrap();

    assert_eq!(stats.branches_changed, 0);
    assert_eq!(stats.apply.branches_applied, 0);
}

/// Dry run guarantees zero mutation calls regardless of diff content.
#[tokio::test]
async fn dry_run_never_modifies() {
    let gateway = MockGateway::new()
        .with_reservations(vec![linux_reservation("res-1", "us-east-1a", 3)])
        .with_instances(vec![linux_instance("us-east-1b")]);

    let worker = RebalanceWorker::new(gateway, config(true));
    let stats = worker.run_cycle().await.unwrap();
    assert_eq!(stats.branches_changed, 1);
    assert_eq!(stats.apply.branches_applied, 0);
    assert_eq!(stats.apply.branches_failed, 0);
    assert!(worker.gateway().recorded_modifies().is_empty());
}

/// A provider failure during the snapshot aborts the cycle with an error.
#[tokio::test]
async fn snapshot_failure_is_fatal_to_the_cycle() {
    let gateway = MockGateway::new();
    gateway.fail_next_lists(1);

    let worker = RebalanceWorker::new(gateway, config(false));
    assert!(worker.run_cycle().await.is_err());
}

/// Per-branch modify failures are counted, not propagated.
#[tokio::test]
async fn modify_failure_is_partial_not_fatal() {
    let gateway = MockGateway::new()
        .with_reservations(vec![linux_reservation("res-1", "us-east-1a", 3)])
        .with_instances(vec![linux_instance("us-east-1b")]);
    gateway.fail_modifies();

    let worker = RebalanceWorker::new(gateway, config(false));
    let stats = worker.run_cycle().await.unwrap();

    assert_eq!(stats.apply.branches_applied, 0);
    assert_eq!(stats.apply.branches_failed, 1);
}

/// One failing branch does not block the others.
#[tokio::test]
async fn failing_branch_does_not_block_others() {
    let mut small = linux_reservation("res-1", "us-east-1a", 2);
    small.instance_type = "m4.large".to_string();
    let mut large = linux_reservation("res-2", "us-east-1a", 2);
    large.instance_type = "c4.xlarge".to_string();

    let mut small_instance = linux_instance("us-east-1b");
    small_instance.instance_type = "m4.large".to_string();
    let mut large_instance = linux_instance("us-east-1b");
    large_instance.instance_type = "c4.xlarge".to_string();

    let gateway = MockGateway::new()
        .with_reservations(vec![small, large])
        .with_instances(vec![
            small_instance.clone(),
            small_instance,
            large_instance.clone(),
            large_instance,
        ]);
    gateway.fail_modifies_for_shape("m4.large");

    let worker = RebalanceWorker::new(gateway, config(false));
    let stats = worker.run_cycle().await.unwrap();

    assert_eq!(stats.branches_changed, 2);
    assert_eq!(stats.apply.branches_applied, 1);
    assert_eq!(stats.apply.branches_failed, 1);

    let calls = worker.gateway().recorded_modifies();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].targets[0].instance_type, "c4.xlarge");
}

/// Convergence idempotence: once the provider reflects the applied targets,
/// the next cycle's diff is empty and nothing further is submitted.
#[tokio::test]
async fn applying_targets_converges_the_next_cycle() {
    let gateway = MockGateway::new()
        .with_reservations(vec![linux_reservation("res-1", "us-east-1a", 2)])
        .with_instances(vec![linux_instance("us-east-1b"), linux_instance("us-east-1b")]);

    let worker = RebalanceWorker::new(gateway, config(false));
    let first = worker.run_cycle().await.unwrap();
    assert_eq!(first.apply.branches_applied, 1);

    // Simulate the provider reflecting the applied change.
    worker
        .gateway()
        .set_reservations(vec![linux_reservation("res-1", "us-east-1b", 2)]);

    let second = worker.run_cycle().await.unwrap();
    assert_eq!(second.branches_changed, 0);
    assert!(worker.gateway().recorded_modifies().len() == 1);
}
