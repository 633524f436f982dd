//! RDS operations traits for testing
//!
//! These traits abstract the RDS client per resource type so the
//! reconcilers and the waiter can be driven by an in-memory fake in tests
//! without hitting real AWS.

use super::types::{
    ClusterMutation, ClusterSnapshot, CreateClusterRequest, CreateInstanceRequest, DbCluster,
    DbInstance, InstanceMutation, RestoreClusterRequest, SnapshotFilter,
};
use super::RdsClient;
use crate::aws::error::RdsError;
use std::collections::BTreeMap;
use std::future::Future;

/// DB cluster lifecycle operations
pub trait ClusterOperations: Send + Sync {
    /// Fetch a cluster by identifier
    fn describe_cluster(
        &self,
        cluster_id: &str,
    ) -> impl Future<Output = Result<DbCluster, RdsError>> + Send;

    /// Create a new cluster
    fn create_cluster(
        &self,
        request: CreateClusterRequest,
    ) -> impl Future<Output = Result<DbCluster, RdsError>> + Send;

    /// Restore a cluster from a snapshot
    fn restore_cluster_from_snapshot(
        &self,
        request: RestoreClusterRequest,
    ) -> impl Future<Output = Result<DbCluster, RdsError>> + Send;

    /// Apply a non-empty mutation set to an existing cluster
    fn modify_cluster(
        &self,
        cluster_id: &str,
        mutation: ClusterMutation,
    ) -> impl Future<Output = Result<DbCluster, RdsError>> + Send;

    /// Delete a cluster, skipping the final snapshot
    fn delete_cluster(
        &self,
        cluster_id: &str,
    ) -> impl Future<Output = Result<DbCluster, RdsError>> + Send;
}

/// DB cluster instance lifecycle operations
pub trait InstanceOperations: Send + Sync {
    /// Fetch an instance by identifier
    fn describe_instance(
        &self,
        instance_id: &str,
    ) -> impl Future<Output = Result<DbInstance, RdsError>> + Send;

    /// Create a new cluster instance
    fn create_instance(
        &self,
        request: CreateInstanceRequest,
    ) -> impl Future<Output = Result<DbInstance, RdsError>> + Send;

    /// Apply a non-empty mutation set to an existing instance
    fn modify_instance(
        &self,
        instance_id: &str,
        mutation: InstanceMutation,
        apply_immediately: bool,
    ) -> impl Future<Output = Result<DbInstance, RdsError>> + Send;

    /// Delete an instance
    fn delete_instance(
        &self,
        instance_id: &str,
    ) -> impl Future<Output = Result<DbInstance, RdsError>> + Send;
}

/// DB cluster snapshot queries
pub trait SnapshotOperations: Send + Sync {
    /// List cluster snapshots matching the remote filter
    fn describe_cluster_snapshots(
        &self,
        filter: SnapshotFilter,
    ) -> impl Future<Output = Result<Vec<ClusterSnapshot>, RdsError>> + Send;
}

/// Resource tag operations, keyed by ARN
pub trait TagOperations: Send + Sync {
    /// List tags currently on a resource
    fn list_tags(
        &self,
        arn: &str,
    ) -> impl Future<Output = Result<BTreeMap<String, String>, RdsError>> + Send;

    /// Add (or overwrite) tags on a resource
    fn add_tags(
        &self,
        arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> impl Future<Output = Result<(), RdsError>> + Send;

    /// Remove tags by key from a resource
    fn remove_tags(
        &self,
        arn: &str,
        keys: &[String],
    ) -> impl Future<Output = Result<(), RdsError>> + Send;
}

impl ClusterOperations for RdsClient {
    async fn describe_cluster(&self, cluster_id: &str) -> Result<DbCluster, RdsError> {
        RdsClient::describe_cluster(self, cluster_id).await
    }

    async fn create_cluster(&self, request: CreateClusterRequest) -> Result<DbCluster, RdsError> {
        RdsClient::create_cluster(self, request).await
    }

    async fn restore_cluster_from_snapshot(
        &self,
        request: RestoreClusterRequest,
    ) -> Result<DbCluster, RdsError> {
        RdsClient::restore_cluster_from_snapshot(self, request).await
    }

    async fn modify_cluster(
        &self,
        cluster_id: &str,
        mutation: ClusterMutation,
    ) -> Result<DbCluster, RdsError> {
        RdsClient::modify_cluster(self, cluster_id, mutation).await
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<DbCluster, RdsError> {
        RdsClient::delete_cluster(self, cluster_id).await
    }
}

impl InstanceOperations for RdsClient {
    async fn describe_instance(&self, instance_id: &str) -> Result<DbInstance, RdsError> {
        RdsClient::describe_instance(self, instance_id).await
    }

    async fn create_instance(&self, request: CreateInstanceRequest) -> Result<DbInstance, RdsError> {
        RdsClient::create_instance(self, request).await
    }

    async fn modify_instance(
        &self,
        instance_id: &str,
        mutation: InstanceMutation,
        apply_immediately: bool,
    ) -> Result<DbInstance, RdsError> {
        RdsClient::modify_instance(self, instance_id, mutation, apply_immediately).await
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<DbInstance, RdsError> {
        RdsClient::delete_instance(self, instance_id).await
    }
}

impl SnapshotOperations for RdsClient {
    async fn describe_cluster_snapshots(
        &self,
        filter: SnapshotFilter,
    ) -> Result<Vec<ClusterSnapshot>, RdsError> {
        RdsClient::describe_cluster_snapshots(self, filter).await
    }
}

impl TagOperations for RdsClient {
    async fn list_tags(&self, arn: &str) -> Result<BTreeMap<String, String>, RdsError> {
        RdsClient::list_tags(self, arn).await
    }

    async fn add_tags(&self, arn: &str, tags: &BTreeMap<String, String>) -> Result<(), RdsError> {
        RdsClient::add_tags(self, arn, tags).await
    }

    async fn remove_tags(&self, arn: &str, keys: &[String]) -> Result<(), RdsError> {
        RdsClient::remove_tags(self, arn, keys).await
    }
}
