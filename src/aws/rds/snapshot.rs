//! DB cluster snapshot call sites

use super::types::{api_args, ClusterSnapshot, SnapshotFilter};
use super::RdsClient;
use crate::aws::error::{classify_sdk_error, RdsError};
use tracing::debug;

impl RdsClient {
    /// List cluster snapshots matching the remote filter.
    ///
    /// Describing a snapshot identifier that does not exist raises
    /// DBClusterSnapshotNotFoundFault; callers searching broadly leave the
    /// identifier unset and get an empty list instead.
    pub(crate) async fn describe_cluster_snapshots(
        &self,
        filter: SnapshotFilter,
    ) -> Result<Vec<ClusterSnapshot>, RdsError> {
        debug!(filter = ?filter, "Describing DB cluster snapshots");
        let args = api_args(&filter);
        let target = filter
            .snapshot_id
            .as_deref()
            .or(filter.cluster_id.as_deref())
            .unwrap_or("<all>")
            .to_string();

        let output = self
            .client
            .describe_db_cluster_snapshots()
            .set_db_cluster_snapshot_identifier(filter.snapshot_id.clone())
            .set_db_cluster_identifier(filter.cluster_id.clone())
            .set_snapshot_type(filter.snapshot_type.clone())
            .set_max_records(filter.max_records)
            .send()
            .await
            .map_err(|e| classify_sdk_error("DescribeDBClusterSnapshots", &target, e, args))?;

        Ok(output
            .db_cluster_snapshots()
            .iter()
            .map(ClusterSnapshot::from_sdk)
            .collect())
    }
}
