//! RDS gateway
//!
//! `RdsClient` wraps the SDK client; the call sites live in per-resource
//! submodules and the `operations` traits expose them for mocking.

mod cluster;
mod instance;
mod operations;
mod snapshot;
mod tags;
mod types;

pub use operations::{ClusterOperations, InstanceOperations, SnapshotOperations, TagOperations};
pub use types::{
    ClusterMutation, ClusterSnapshot, CreateClusterRequest, CreateInstanceRequest, DbCluster,
    DbInstance, InstanceMutation, LogExportsDelta, RestoreClusterRequest, SnapshotFilter,
};

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::RdsError;
use aws_sdk_rds::Client;

/// A successful describe that returns no records is an API anomaly, not an
/// absence signal; only the service's not-found fault code stands for
/// "resource does not exist".
pub(crate) fn sole_record<T>(
    record: Option<T>,
    op: &'static str,
    resource_id: &str,
) -> Result<T, RdsError> {
    record.ok_or_else(|| RdsError::Api {
        op,
        code: None,
        message: format!("{op} returned an empty result set for {resource_id}"),
        api_args: None,
    })
}

/// RDS client for managing Aurora clusters, instances, and snapshots
pub struct RdsClient {
    pub(crate) client: Client,
}

impl RdsClient {
    /// Create a new RDS client (loads AWS config from environment)
    pub async fn new(region: &str) -> Self {
        let ctx = AwsContext::new(region).await;
        Self::from_context(&ctx)
    }
}

impl FromAwsContext for RdsClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.rds_client(),
        }
    }
}
