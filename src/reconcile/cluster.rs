//! DB cluster reconciliation

use super::{sets_differ, sync_tags, Action, Reconciled};
use crate::aws::error::RdsError;
use crate::aws::rds::{ClusterMutation, ClusterOperations, DbCluster, TagOperations};
use crate::config::ClusterConfig;
use tracing::{debug, info};

/// Compute the minimal mutation set for an existing cluster.
///
/// Only explicitly-set desired attributes are compared. Security group IDs
/// compare as unordered sets; everything else by direct equality, where a
/// remote `None` against a set desired value counts as different.
pub fn diff_cluster(desired: &ClusterConfig, current: &DbCluster) -> ClusterMutation {
    let mut mutation = ClusterMutation::default();

    if let Some(version) = &desired.engine_version {
        if current.engine_version.as_deref() != Some(version.as_str()) {
            mutation.engine_version = Some(version.clone());
        }
    }
    if let Some(port) = desired.port {
        if current.port != Some(port) {
            mutation.port = Some(port);
        }
    }
    if let Some(option_group) = &desired.option_group {
        if current.option_group.as_deref() != Some(option_group.as_str()) {
            mutation.option_group = Some(option_group.clone());
        }
    }
    if let Some(groups) = &desired.vpc_security_group_ids {
        if sets_differ(groups, &current.vpc_security_group_ids) {
            mutation.vpc_security_group_ids = Some(groups.clone());
        }
    }

    mutation
}

/// Converge a cluster to the desired configuration.
///
/// Absent clusters are restored from `snapshot_arn` when set, created from
/// scratch otherwise. Existing clusters receive at most one modify call
/// carrying exactly the differing attributes; tags are synchronized
/// separately through the ARN tag API.
pub async fn ensure_present<G>(
    gateway: &G,
    config: &ClusterConfig,
) -> Result<Reconciled<DbCluster>, RdsError>
where
    G: ClusterOperations + TagOperations,
{
    match gateway.describe_cluster(&config.cluster_id).await {
        Ok(current) => {
            let mutation = diff_cluster(config, &current);
            let arn = current.arn.clone();

            let reconciled = if mutation.is_empty() {
                debug!(cluster_id = %config.cluster_id, "Cluster already converged");
                Reconciled {
                    resource: current,
                    action: Action::Unchanged,
                }
            } else {
                let modified = gateway.modify_cluster(&config.cluster_id, mutation).await?;
                Reconciled {
                    resource: modified,
                    action: Action::Modified,
                }
            };

            sync_tags(gateway, &arn, config.tags.as_ref()).await?;
            Ok(reconciled)
        }
        Err(e) if e.is_not_found() => {
            let resource = match &config.snapshot_arn {
                Some(snapshot_arn) => {
                    gateway
                        .restore_cluster_from_snapshot(config.restore_request(snapshot_arn))
                        .await?
                }
                None => gateway.create_cluster(config.create_request()).await?,
            };
            let action = if config.snapshot_arn.is_some() {
                Action::Restored
            } else {
                Action::Created
            };
            info!(cluster_id = %config.cluster_id, action = %action, "Cluster provisioned");
            Ok(Reconciled { resource, action })
        }
        Err(e) => Err(e),
    }
}

/// Delete a cluster, treating "already absent" as success.
pub async fn ensure_absent<G: ClusterOperations>(
    gateway: &G,
    cluster_id: &str,
) -> Result<Reconciled<Option<DbCluster>>, RdsError> {
    match gateway.delete_cluster(cluster_id).await {
        Ok(deleted) => Ok(Reconciled {
            resource: Some(deleted),
            action: Action::Deleted,
        }),
        Err(e) if e.is_not_found() => {
            debug!(cluster_id = %cluster_id, "Cluster already absent");
            Ok(Reconciled {
                resource: None,
                action: Action::Unchanged,
            })
        }
        Err(e) => Err(e),
    }
}
