//! RDS resource views and request types
//!
//! The view structs (`DbCluster`, `DbInstance`, `ClusterSnapshot`) are plain
//! serializable data extracted from SDK output shapes at the gateway
//! boundary. Nested SDK structures are flattened here (security group
//! memberships to ID lists, the first option group membership to a name) so
//! the reconcilers can compare attributes directly.
//!
//! The request structs carry only explicitly-set fields and serialize under
//! the RDS API parameter names, which is what gets echoed back as `api_args`
//! when a call fails. The master password is redacted in that output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Convert an SDK timestamp to chrono, dropping unrepresentable values.
pub(crate) fn to_chrono(dt: Option<&aws_sdk_rds::primitives::DateTime>) -> Option<DateTime<Utc>> {
    dt.and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()))
}

/// Live view of an Aurora DB cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbCluster {
    pub cluster_id: String,
    pub arn: String,
    pub status: String,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub port: Option<i32>,
    pub database_name: Option<String>,
    pub subnet_group: Option<String>,
    pub option_group: Option<String>,
    pub vpc_security_group_ids: Vec<String>,
    pub availability_zones: Vec<String>,
    pub master_username: Option<String>,
    pub endpoint: Option<String>,
    pub reader_endpoint: Option<String>,
    pub multi_az: Option<bool>,
    pub cluster_members: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DbCluster {
    /// Extract a view from the SDK output shape.
    pub fn from_sdk(cluster: &aws_sdk_rds::types::DbCluster) -> Self {
        Self {
            cluster_id: cluster.db_cluster_identifier().unwrap_or_default().to_string(),
            arn: cluster.db_cluster_arn().unwrap_or_default().to_string(),
            status: cluster.status().unwrap_or_default().to_string(),
            engine: cluster.engine().map(str::to_string),
            engine_version: cluster.engine_version().map(str::to_string),
            port: cluster.port(),
            database_name: cluster.database_name().map(str::to_string),
            subnet_group: cluster.db_subnet_group().map(str::to_string),
            option_group: cluster
                .db_cluster_option_group_memberships()
                .first()
                .and_then(|m| m.db_cluster_option_group_name())
                .map(str::to_string),
            vpc_security_group_ids: cluster
                .vpc_security_groups()
                .iter()
                .filter_map(|m| m.vpc_security_group_id())
                .map(str::to_string)
                .collect(),
            availability_zones: cluster.availability_zones().to_vec(),
            master_username: cluster.master_username().map(str::to_string),
            endpoint: cluster.endpoint().map(str::to_string),
            reader_endpoint: cluster.reader_endpoint().map(str::to_string),
            multi_az: cluster.multi_az(),
            cluster_members: cluster
                .db_cluster_members()
                .iter()
                .filter_map(|m| m.db_instance_identifier())
                .map(str::to_string)
                .collect(),
            created_at: to_chrono(cluster.cluster_create_time()),
        }
    }
}

/// Live view of an Aurora DB cluster instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbInstance {
    pub instance_id: String,
    pub arn: String,
    pub status: String,
    pub cluster_id: Option<String>,
    pub engine: Option<String>,
    pub instance_type: Option<String>,
    pub availability_zone: Option<String>,
    pub subnet_group: Option<String>,
    /// Names of every associated DB parameter group, in association order
    pub parameter_group_names: Vec<String>,
    pub option_group: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub multi_az: Option<bool>,
    pub auto_minor_version_upgrade: Option<bool>,
    pub publicly_accessible: Option<bool>,
    pub copy_tags_to_snapshot: Option<bool>,
    pub monitoring_interval: Option<i32>,
    pub monitoring_role_arn: Option<String>,
    pub promotion_tier: Option<i32>,
    pub performance_insights_enabled: Option<bool>,
    pub cloudwatch_logs_exports: Vec<String>,
    pub endpoint: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DbInstance {
    /// Extract a view from the SDK output shape.
    pub fn from_sdk(instance: &aws_sdk_rds::types::DbInstance) -> Self {
        Self {
            instance_id: instance
                .db_instance_identifier()
                .unwrap_or_default()
                .to_string(),
            arn: instance.db_instance_arn().unwrap_or_default().to_string(),
            status: instance.db_instance_status().unwrap_or_default().to_string(),
            cluster_id: instance.db_cluster_identifier().map(str::to_string),
            engine: instance.engine().map(str::to_string),
            instance_type: instance.db_instance_class().map(str::to_string),
            availability_zone: instance.availability_zone().map(str::to_string),
            subnet_group: instance
                .db_subnet_group()
                .and_then(|g| g.db_subnet_group_name())
                .map(str::to_string),
            parameter_group_names: instance
                .db_parameter_groups()
                .iter()
                .filter_map(|g| g.db_parameter_group_name())
                .map(str::to_string)
                .collect(),
            option_group: instance
                .option_group_memberships()
                .first()
                .and_then(|m| m.option_group_name())
                .map(str::to_string),
            preferred_maintenance_window: instance
                .preferred_maintenance_window()
                .map(str::to_string),
            multi_az: instance.multi_az(),
            auto_minor_version_upgrade: instance.auto_minor_version_upgrade(),
            publicly_accessible: instance.publicly_accessible(),
            copy_tags_to_snapshot: instance.copy_tags_to_snapshot(),
            monitoring_interval: instance.monitoring_interval(),
            monitoring_role_arn: instance.monitoring_role_arn().map(str::to_string),
            promotion_tier: instance.promotion_tier(),
            performance_insights_enabled: instance.performance_insights_enabled(),
            cloudwatch_logs_exports: instance.enabled_cloudwatch_logs_exports().to_vec(),
            endpoint: instance
                .endpoint()
                .and_then(|e| e.address())
                .map(str::to_string),
            created_at: to_chrono(instance.instance_create_time()),
        }
    }
}

/// View of a DB cluster snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSnapshot {
    pub snapshot_id: String,
    pub cluster_id: String,
    pub arn: String,
    pub status: Option<String>,
    pub snapshot_type: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub port: Option<i32>,
    pub vpc_id: Option<String>,
    pub availability_zones: Vec<String>,
    pub allocated_storage: Option<i32>,
    pub master_username: Option<String>,
    pub license_model: Option<String>,
    pub percent_progress: Option<i32>,
    pub storage_encrypted: Option<bool>,
    pub iam_database_authentication_enabled: Option<bool>,
    pub kms_key_id: Option<String>,
    pub source_snapshot_arn: Option<String>,
    pub snapshot_create_time: Option<DateTime<Utc>>,
    pub cluster_create_time: Option<DateTime<Utc>>,
}

impl ClusterSnapshot {
    /// Extract a view from the SDK output shape.
    pub fn from_sdk(snapshot: &aws_sdk_rds::types::DbClusterSnapshot) -> Self {
        Self {
            snapshot_id: snapshot
                .db_cluster_snapshot_identifier()
                .unwrap_or_default()
                .to_string(),
            cluster_id: snapshot
                .db_cluster_identifier()
                .unwrap_or_default()
                .to_string(),
            arn: snapshot
                .db_cluster_snapshot_arn()
                .unwrap_or_default()
                .to_string(),
            status: snapshot.status().map(str::to_string),
            snapshot_type: snapshot.snapshot_type().map(str::to_string),
            engine: snapshot.engine().map(str::to_string),
            engine_version: snapshot.engine_version().map(str::to_string),
            port: snapshot.port(),
            vpc_id: snapshot.vpc_id().map(str::to_string),
            availability_zones: snapshot.availability_zones().to_vec(),
            allocated_storage: snapshot.allocated_storage(),
            master_username: snapshot.master_username().map(str::to_string),
            license_model: snapshot.license_model().map(str::to_string),
            percent_progress: snapshot.percent_progress(),
            storage_encrypted: snapshot.storage_encrypted(),
            iam_database_authentication_enabled: snapshot.iam_database_authentication_enabled(),
            kms_key_id: snapshot.kms_key_id().map(str::to_string),
            source_snapshot_arn: snapshot
                .source_db_cluster_snapshot_arn()
                .map(str::to_string),
            snapshot_create_time: to_chrono(snapshot.snapshot_create_time()),
            cluster_create_time: to_chrono(snapshot.cluster_create_time()),
        }
    }
}

fn redact_password<S>(_: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("<redacted>")
}

/// Arguments for CreateDBCluster. Optional fields are omitted from the
/// request entirely when unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateClusterRequest {
    #[serde(rename = "DBClusterIdentifier")]
    pub cluster_id: String,
    #[serde(rename = "Engine")]
    pub engine: String,
    #[serde(rename = "DBSubnetGroupName")]
    pub subnet_group: String,
    #[serde(rename = "MasterUsername", skip_serializing_if = "Option::is_none")]
    pub master_username: Option<String>,
    #[serde(
        rename = "MasterUserPassword",
        skip_serializing_if = "Option::is_none",
        serialize_with = "redact_password"
    )]
    pub master_password: Option<String>,
    #[serde(rename = "EngineVersion", skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(rename = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(rename = "DatabaseName", skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(rename = "OptionGroupName", skip_serializing_if = "Option::is_none")]
    pub option_group: Option<String>,
    #[serde(
        rename = "VpcSecurityGroupIds",
        skip_serializing_if = "Option::is_none"
    )]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(rename = "AvailabilityZones", skip_serializing_if = "Option::is_none")]
    pub availability_zones: Option<Vec<String>>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Arguments for RestoreDBClusterFromSnapshot. Master credentials never
/// appear here; a restored cluster keeps the snapshot's credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreClusterRequest {
    #[serde(rename = "DBClusterIdentifier")]
    pub cluster_id: String,
    #[serde(rename = "SnapshotIdentifier")]
    pub snapshot_arn: String,
    #[serde(rename = "Engine")]
    pub engine: String,
    #[serde(rename = "DBSubnetGroupName")]
    pub subnet_group: String,
    #[serde(rename = "EngineVersion", skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(rename = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(rename = "DatabaseName", skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    #[serde(rename = "OptionGroupName", skip_serializing_if = "Option::is_none")]
    pub option_group: Option<String>,
    #[serde(
        rename = "VpcSecurityGroupIds",
        skip_serializing_if = "Option::is_none"
    )]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(rename = "AvailabilityZones", skip_serializing_if = "Option::is_none")]
    pub availability_zones: Option<Vec<String>>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Minimal change set for ModifyDBCluster.
///
/// Only attributes the modify API accepts appear here; attributes that are
/// fixed at creation (database name, availability zones) never produce a
/// mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterMutation {
    #[serde(rename = "EngineVersion", skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(rename = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(rename = "OptionGroupName", skip_serializing_if = "Option::is_none")]
    pub option_group: Option<String>,
    #[serde(
        rename = "VpcSecurityGroupIds",
        skip_serializing_if = "Option::is_none"
    )]
    pub vpc_security_group_ids: Option<Vec<String>>,
}

impl ClusterMutation {
    /// True when no attribute differs; an empty mutation must not be applied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Arguments for CreateDBInstance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateInstanceRequest {
    #[serde(rename = "DBInstanceIdentifier")]
    pub instance_id: String,
    #[serde(rename = "Engine")]
    pub engine: String,
    #[serde(rename = "DBClusterIdentifier", skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(rename = "DBSubnetGroupName", skip_serializing_if = "Option::is_none")]
    pub subnet_group: Option<String>,
    #[serde(rename = "DBInstanceClass", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(rename = "AvailabilityZone", skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(
        rename = "PreferredMaintenanceWindow",
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_maintenance_window: Option<String>,
    #[serde(
        rename = "DBParameterGroupName",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameter_group: Option<String>,
    #[serde(rename = "MultiAZ", skip_serializing_if = "Option::is_none")]
    pub multi_az: Option<bool>,
    #[serde(
        rename = "AutoMinorVersionUpgrade",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_minor_version_upgrade: Option<bool>,
    #[serde(rename = "OptionGroupName", skip_serializing_if = "Option::is_none")]
    pub option_group: Option<String>,
    #[serde(rename = "PubliclyAccessible", skip_serializing_if = "Option::is_none")]
    pub publicly_accessible: Option<bool>,
    #[serde(
        rename = "CopyTagsToSnapshot",
        skip_serializing_if = "Option::is_none"
    )]
    pub copy_tags_to_snapshot: Option<bool>,
    #[serde(rename = "MonitoringInterval", skip_serializing_if = "Option::is_none")]
    pub monitoring_interval: Option<i32>,
    #[serde(rename = "MonitoringRoleArn", skip_serializing_if = "Option::is_none")]
    pub monitoring_role_arn: Option<String>,
    #[serde(rename = "PromotionTier", skip_serializing_if = "Option::is_none")]
    pub promotion_tier: Option<i32>,
    #[serde(
        rename = "EnablePerformanceInsights",
        skip_serializing_if = "Option::is_none"
    )]
    pub performance_insights: Option<bool>,
    #[serde(
        rename = "EnableCloudwatchLogsExports",
        skip_serializing_if = "Option::is_none"
    )]
    pub cloudwatch_logs_exports: Option<Vec<String>>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Log export changes for ModifyDBInstance.
///
/// The modify API takes an enable/disable delta rather than the full list,
/// so the diff computes both halves against the current exports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogExportsDelta {
    #[serde(rename = "EnableLogTypes", skip_serializing_if = "Vec::is_empty")]
    pub enable: Vec<String>,
    #[serde(rename = "DisableLogTypes", skip_serializing_if = "Vec::is_empty")]
    pub disable: Vec<String>,
}

/// Minimal change set for ModifyDBInstance.
///
/// `availability_zone` is fixed at creation and never mutated. The
/// `apply_immediately` behavior flag travels separately since it is not an
/// attribute of the instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstanceMutation {
    #[serde(rename = "DBInstanceClass", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(
        rename = "PreferredMaintenanceWindow",
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_maintenance_window: Option<String>,
    #[serde(
        rename = "DBParameterGroupName",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameter_group: Option<String>,
    #[serde(rename = "MultiAZ", skip_serializing_if = "Option::is_none")]
    pub multi_az: Option<bool>,
    #[serde(
        rename = "AutoMinorVersionUpgrade",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_minor_version_upgrade: Option<bool>,
    #[serde(rename = "OptionGroupName", skip_serializing_if = "Option::is_none")]
    pub option_group: Option<String>,
    #[serde(rename = "PubliclyAccessible", skip_serializing_if = "Option::is_none")]
    pub publicly_accessible: Option<bool>,
    #[serde(
        rename = "CopyTagsToSnapshot",
        skip_serializing_if = "Option::is_none"
    )]
    pub copy_tags_to_snapshot: Option<bool>,
    #[serde(rename = "MonitoringInterval", skip_serializing_if = "Option::is_none")]
    pub monitoring_interval: Option<i32>,
    #[serde(rename = "MonitoringRoleArn", skip_serializing_if = "Option::is_none")]
    pub monitoring_role_arn: Option<String>,
    #[serde(rename = "PromotionTier", skip_serializing_if = "Option::is_none")]
    pub promotion_tier: Option<i32>,
    #[serde(
        rename = "EnablePerformanceInsights",
        skip_serializing_if = "Option::is_none"
    )]
    pub performance_insights: Option<bool>,
    #[serde(
        rename = "CloudwatchLogsExportConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    pub cloudwatch_logs_exports: Option<LogExportsDelta>,
}

impl InstanceMutation {
    /// True when no attribute differs; an empty mutation must not be applied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Remote filter for DescribeDBClusterSnapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotFilter {
    #[serde(
        rename = "DBClusterSnapshotIdentifier",
        skip_serializing_if = "Option::is_none"
    )]
    pub snapshot_id: Option<String>,
    #[serde(rename = "DBClusterIdentifier", skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(rename = "SnapshotType", skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
    #[serde(rename = "MaxRecords", skip_serializing_if = "Option::is_none")]
    pub max_records: Option<i32>,
}

/// Serialize a request for the `api_args` echo on failures.
pub(crate) fn api_args<T: Serialize>(request: &T) -> Option<serde_json::Value> {
    serde_json::to_value(request).ok()
}
