//! Cluster reconciliation tests against the in-memory gateway

mod support;

use auroractl::aws::rds::ClusterMutation;
use auroractl::aws::RdsError;
use auroractl::config::{ClusterConfig, Engine};
use auroractl::reconcile::cluster::{ensure_absent, ensure_present};
use auroractl::reconcile::Action;
use std::collections::BTreeMap;
use support::{sample_cluster, Call, FakeRds};

fn base_config(cluster_id: &str) -> ClusterConfig {
    ClusterConfig {
        cluster_id: cluster_id.to_string(),
        engine: Engine::Aurora,
        subnet_group: Some("subnets".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn absent_cluster_is_created_directly() {
    let rds = FakeRds::new();
    let config = ClusterConfig {
        vpc_security_group_ids: Some(vec!["sg-1".to_string()]),
        ..base_config("c1")
    };

    let outcome = ensure_present(&rds, &config).await.unwrap();

    assert_eq!(outcome.action, Action::Created);
    assert!(outcome.created());
    assert!(outcome.changed());
    assert_eq!(outcome.resource.cluster_id, "c1");
    assert_eq!(outcome.resource.engine.as_deref(), Some("aurora"));

    let calls = rds.calls();
    assert!(matches!(calls[0], Call::DescribeCluster(ref id) if id == "c1"));
    match &calls[1] {
        Call::CreateCluster(request) => {
            assert_eq!(request.engine, "aurora");
            assert_eq!(request.subnet_group, "subnets");
            assert_eq!(
                request.vpc_security_group_ids,
                Some(vec!["sg-1".to_string()])
            );
        }
        other => panic!("expected a create call, got {other:?}"),
    }
}

#[tokio::test]
async fn absent_cluster_with_snapshot_is_restored() {
    let rds = FakeRds::new();
    let config = ClusterConfig {
        snapshot_arn: Some("arn:aws:rds:us-east-1:123456789012:cluster-snapshot:snap".to_string()),
        master_username: Some("admin".to_string()),
        master_password: Some("hunter2".to_string()),
        ..base_config("c1")
    };

    let outcome = ensure_present(&rds, &config).await.unwrap();

    assert_eq!(outcome.action, Action::Restored);
    assert!(outcome.created());

    match &rds.calls()[1] {
        Call::RestoreCluster(request) => {
            assert_eq!(
                request.snapshot_arn,
                "arn:aws:rds:us-east-1:123456789012:cluster-snapshot:snap"
            );
            // Restored clusters keep the snapshot's credentials; none travel
            let rendered = serde_json::to_string(request).unwrap();
            assert!(!rendered.contains("hunter2"));
        }
        other => panic!("expected a restore call, got {other:?}"),
    }
}

#[tokio::test]
async fn second_pass_is_a_no_op() {
    let rds = FakeRds::new();
    let config = base_config("c1");

    let first = ensure_present(&rds, &config).await.unwrap();
    assert_eq!(first.action, Action::Created);

    let second = ensure_present(&rds, &config).await.unwrap();
    assert_eq!(second.action, Action::Unchanged);
    assert!(!second.changed());

    // No modify call in either pass
    assert!(rds
        .calls()
        .iter()
        .all(|c| !matches!(c, Call::ModifyCluster(..))));
}

#[tokio::test]
async fn drifted_attribute_triggers_minimal_modify() {
    let rds = FakeRds::new().with_cluster(sample_cluster("c1"));
    let config = ClusterConfig {
        port: Some(5432),
        engine_version: Some("5.6.10a".to_string()),
        ..base_config("c1")
    };

    let outcome = ensure_present(&rds, &config).await.unwrap();

    assert_eq!(outcome.action, Action::Modified);
    assert_eq!(outcome.resource.port, Some(5432));

    let calls = rds.calls();
    let mutations: Vec<&ClusterMutation> = calls
        .iter()
        .filter_map(|c| match c {
            Call::ModifyCluster(_, mutation) => Some(mutation),
            _ => None,
        })
        .collect();
    assert_eq!(mutations.len(), 1);
    // Only the drifted attribute travels
    assert_eq!(mutations[0].port, Some(5432));
    assert!(mutations[0].engine_version.is_none());
    assert!(mutations[0].vpc_security_group_ids.is_none());
}

#[tokio::test]
async fn security_group_order_does_not_trigger_modify() {
    let mut cluster = sample_cluster("c1");
    cluster.vpc_security_group_ids = vec!["sg-1".to_string(), "sg-2".to_string()];
    let rds = FakeRds::new().with_cluster(cluster);

    let config = ClusterConfig {
        vpc_security_group_ids: Some(vec!["sg-2".to_string(), "sg-1".to_string()]),
        ..base_config("c1")
    };

    let outcome = ensure_present(&rds, &config).await.unwrap();
    assert_eq!(outcome.action, Action::Unchanged);
}

#[tokio::test]
async fn tags_are_replaced_on_every_pass() {
    let cluster = sample_cluster("c1");
    let arn = cluster.arn.clone();
    let stale: BTreeMap<String, String> =
        [("Owner".to_string(), "old-team".to_string())].into();
    let rds = FakeRds::new().with_cluster(cluster).with_tags(&arn, stale);

    let desired: BTreeMap<String, String> = [
        ("Env".to_string(), "staging".to_string()),
        ("Owner".to_string(), "data".to_string()),
    ]
    .into();
    let config = ClusterConfig {
        tags: Some(desired.clone()),
        ..base_config("c1")
    };

    let outcome = ensure_present(&rds, &config).await.unwrap();
    // Tag sync alone does not count as a resource modification
    assert_eq!(outcome.action, Action::Unchanged);
    assert_eq!(rds.tags_on(&arn), desired);

    let calls = rds.calls();
    assert!(calls
        .iter()
        .any(|c| matches!(c, Call::RemoveTags(a, keys) if a == &arn && keys == &vec!["Owner".to_string()])));
    assert!(calls
        .iter()
        .any(|c| matches!(c, Call::AddTags(a, tags) if a == &arn && tags == &desired)));
}

#[tokio::test]
async fn unmanaged_tags_still_clear_stale_ones() {
    let cluster = sample_cluster("c1");
    let arn = cluster.arn.clone();
    let stale: BTreeMap<String, String> = [("Env".to_string(), "old".to_string())].into();
    let rds = FakeRds::new().with_cluster(cluster).with_tags(&arn, stale);

    ensure_present(&rds, &base_config("c1")).await.unwrap();

    assert!(rds.tags_on(&arn).is_empty());
    assert!(rds
        .calls()
        .iter()
        .all(|c| !matches!(c, Call::AddTags(..))));
}

#[tokio::test]
async fn fatal_describe_error_propagates() {
    let rds = FakeRds::new();
    rds.fail_next(
        "describe_cluster",
        RdsError::Api {
            op: "DescribeDBClusters",
            code: Some("AccessDenied".to_string()),
            message: "not authorized".to_string(),
            api_args: None,
        },
    );

    let err = ensure_present(&rds, &base_config("c1")).await.unwrap_err();
    assert!(!err.is_not_found());
    // No create attempt after a non-NotFound failure
    assert_eq!(rds.calls().len(), 1);
}

#[tokio::test]
async fn ensure_absent_deletes_and_reports() {
    let rds = FakeRds::new().with_cluster(sample_cluster("c1"));

    let outcome = ensure_absent(&rds, "c1").await.unwrap();
    assert_eq!(outcome.action, Action::Deleted);
    assert_eq!(
        outcome.resource.as_ref().map(|c| c.cluster_id.as_str()),
        Some("c1")
    );
}

#[tokio::test]
async fn ensure_absent_is_idempotent() {
    let rds = FakeRds::new();

    let outcome = ensure_absent(&rds, "ghost").await.unwrap();
    assert_eq!(outcome.action, Action::Unchanged);
    assert!(outcome.resource.is_none());
    assert!(!outcome.changed());
}

#[tokio::test]
async fn ensure_absent_propagates_conflicts() {
    let rds = FakeRds::new().with_cluster(sample_cluster("c1"));
    rds.fail_next(
        "delete_cluster",
        RdsError::Conflict {
            code: "InvalidDBClusterStateFault".to_string(),
            message: "cluster has active instances".to_string(),
        },
    );

    let err = ensure_absent(&rds, "c1").await.unwrap_err();
    assert!(err.is_conflict());
}
