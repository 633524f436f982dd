//! DB cluster call sites

use super::types::{
    api_args, ClusterMutation, CreateClusterRequest, DbCluster, RestoreClusterRequest,
};
use super::RdsClient;
use crate::aws::error::{classify_sdk_error, RdsError};
use crate::aws::rds::tags::to_sdk_tags;
use tracing::{debug, info};

impl RdsClient {
    /// Fetch a cluster by identifier. Only the service's not-found fault
    /// signals absence; an empty result set is surfaced as an API error.
    pub(crate) async fn describe_cluster(&self, cluster_id: &str) -> Result<DbCluster, RdsError> {
        debug!(cluster_id = %cluster_id, "Describing DB cluster");

        let output = self
            .client
            .describe_db_clusters()
            .db_cluster_identifier(cluster_id)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    "DescribeDBClusters",
                    cluster_id,
                    e,
                    api_args(&serde_json::json!({ "DBClusterIdentifier": cluster_id })),
                )
            })?;

        super::sole_record(
            output.db_clusters().first().map(DbCluster::from_sdk),
            "DescribeDBClusters",
            cluster_id,
        )
    }

    /// Create a new cluster from scratch.
    pub(crate) async fn create_cluster(
        &self,
        request: CreateClusterRequest,
    ) -> Result<DbCluster, RdsError> {
        info!(
            cluster_id = %request.cluster_id,
            engine = %request.engine,
            "Creating DB cluster"
        );
        let args = api_args(&request);

        let output = self
            .client
            .create_db_cluster()
            .db_cluster_identifier(&request.cluster_id)
            .engine(&request.engine)
            .db_subnet_group_name(&request.subnet_group)
            .set_master_username(request.master_username.clone())
            .set_master_user_password(request.master_password.clone())
            .set_engine_version(request.engine_version.clone())
            .set_port(request.port)
            .set_database_name(request.database_name.clone())
            .set_option_group_name(request.option_group.clone())
            .set_vpc_security_group_ids(request.vpc_security_group_ids.clone())
            .set_availability_zones(request.availability_zones.clone())
            .set_tags(request.tags.as_ref().map(to_sdk_tags))
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error("CreateDBCluster", &request.cluster_id, e, args.clone())
            })?;

        output
            .db_cluster()
            .map(DbCluster::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "CreateDBCluster",
                code: None,
                message: "response contained no DB cluster".to_string(),
                api_args: args,
            })
    }

    /// Restore a cluster from a snapshot. Master credentials carry over from
    /// the snapshot and are never submitted here.
    pub(crate) async fn restore_cluster_from_snapshot(
        &self,
        request: RestoreClusterRequest,
    ) -> Result<DbCluster, RdsError> {
        info!(
            cluster_id = %request.cluster_id,
            snapshot = %request.snapshot_arn,
            "Restoring DB cluster from snapshot"
        );
        let args = api_args(&request);

        let output = self
            .client
            .restore_db_cluster_from_snapshot()
            .db_cluster_identifier(&request.cluster_id)
            .snapshot_identifier(&request.snapshot_arn)
            .engine(&request.engine)
            .db_subnet_group_name(&request.subnet_group)
            .set_engine_version(request.engine_version.clone())
            .set_port(request.port)
            .set_database_name(request.database_name.clone())
            .set_option_group_name(request.option_group.clone())
            .set_vpc_security_group_ids(request.vpc_security_group_ids.clone())
            .set_availability_zones(request.availability_zones.clone())
            .set_tags(request.tags.as_ref().map(to_sdk_tags))
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    "RestoreDBClusterFromSnapshot",
                    &request.cluster_id,
                    e,
                    args.clone(),
                )
            })?;

        output
            .db_cluster()
            .map(DbCluster::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "RestoreDBClusterFromSnapshot",
                code: None,
                message: "response contained no DB cluster".to_string(),
                api_args: args,
            })
    }

    /// Apply a mutation set to an existing cluster. Callers guarantee the
    /// mutation is non-empty.
    pub(crate) async fn modify_cluster(
        &self,
        cluster_id: &str,
        mutation: ClusterMutation,
    ) -> Result<DbCluster, RdsError> {
        info!(cluster_id = %cluster_id, mutation = ?mutation, "Modifying DB cluster");
        let args = api_args(&mutation);

        let output = self
            .client
            .modify_db_cluster()
            .db_cluster_identifier(cluster_id)
            .set_engine_version(mutation.engine_version.clone())
            .set_port(mutation.port)
            .set_option_group_name(mutation.option_group.clone())
            .set_vpc_security_group_ids(mutation.vpc_security_group_ids.clone())
            .send()
            .await
            .map_err(|e| classify_sdk_error("ModifyDBCluster", cluster_id, e, args.clone()))?;

        output
            .db_cluster()
            .map(DbCluster::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "ModifyDBCluster",
                code: None,
                message: "response contained no DB cluster".to_string(),
                api_args: args,
            })
    }

    /// Delete a cluster, skipping the final snapshot.
    pub(crate) async fn delete_cluster(&self, cluster_id: &str) -> Result<DbCluster, RdsError> {
        info!(cluster_id = %cluster_id, "Deleting DB cluster");
        let args = api_args(&serde_json::json!({
            "DBClusterIdentifier": cluster_id,
            "SkipFinalSnapshot": true,
        }));

        let output = self
            .client
            .delete_db_cluster()
            .db_cluster_identifier(cluster_id)
            .skip_final_snapshot(true)
            .send()
            .await
            .map_err(|e| classify_sdk_error("DeleteDBCluster", cluster_id, e, args.clone()))?;

        output
            .db_cluster()
            .map(DbCluster::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "DeleteDBCluster",
                code: None,
                message: "response contained no DB cluster".to_string(),
                api_args: args,
            })
    }
}
