//! Desired-state configuration for clusters and instances
//!
//! Every managed attribute is optional: `None` means "leave as default /
//! don't manage" and never reaches a request or a diff. Validation runs
//! before any remote call.

use crate::aws::rds::{CreateClusterRequest, CreateInstanceRequest, RestoreClusterRequest};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Default wait deadline for a direct cluster create or modify
pub const DEFAULT_CLUSTER_WAIT: Duration = Duration::from_secs(600);

/// Default wait deadline for a snapshot restore. Restores are slow; the
/// default allows a full hour.
pub const DEFAULT_RESTORE_WAIT: Duration = Duration::from_secs(3600);

/// Default wait deadline for an instance
pub const DEFAULT_INSTANCE_WAIT: Duration = Duration::from_secs(1200);

/// Enhanced monitoring intervals accepted by RDS, in seconds
pub const VALID_MONITORING_INTERVALS: &[i32] = &[0, 1, 5, 10, 15, 30, 60];

/// Target state for a reconciliation
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Aurora database engine
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Engine {
    #[default]
    Aurora,
    AuroraMysql,
    AuroraPostgresql,
}

/// Caller-supplied options rejected before any remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("subnet_group is required when state is present")]
    MissingSubnetGroup,

    #[error("multi_az cannot be combined with an explicit availability_zone")]
    MultiAzWithAvailabilityZone,

    #[error("monitoring_interval must be one of 0, 1, 5, 10, 15, 30, 60 (got {0})")]
    InvalidMonitoringInterval(i32),

    #[error("monitoring_role_arn is required when monitoring_interval > 0")]
    MissingMonitoringRole,

    #[error("snapshot_id and cluster_id are mutually exclusive")]
    ConflictingSnapshotFilters,

    #[error("invalid id_regex: {0}")]
    InvalidIdRegex(String),
}

/// Desired state of an Aurora DB cluster
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    pub cluster_id: String,
    /// Restore source; when set and the cluster is absent, the cluster is
    /// restored from this snapshot instead of created from scratch
    pub snapshot_arn: Option<String>,
    pub engine: Engine,
    pub engine_version: Option<String>,
    /// Only applies to direct creation, never to restore or modify
    pub master_username: Option<String>,
    /// Only applies to direct creation, never to restore or modify
    pub master_password: Option<String>,
    pub port: Option<i32>,
    pub subnet_group: Option<String>,
    pub database_name: Option<String>,
    pub option_group: Option<String>,
    pub vpc_security_group_ids: Option<Vec<String>>,
    pub availability_zones: Option<Vec<String>>,
    pub tags: Option<BTreeMap<String, String>>,
}

impl ClusterConfig {
    /// Reject malformed option combinations before any remote call.
    pub fn validate(&self, state: State) -> Result<(), ValidationError> {
        if state == State::Present && self.subnet_group.is_none() {
            return Err(ValidationError::MissingSubnetGroup);
        }
        Ok(())
    }

    /// The subnet group, after `validate` has established it is set.
    fn subnet_group(&self) -> String {
        self.subnet_group.clone().unwrap_or_default()
    }

    /// Build the direct-create request from the explicitly-set fields.
    pub fn create_request(&self) -> CreateClusterRequest {
        CreateClusterRequest {
            cluster_id: self.cluster_id.clone(),
            engine: self.engine.to_string(),
            subnet_group: self.subnet_group(),
            master_username: self.master_username.clone(),
            master_password: self.master_password.clone(),
            engine_version: self.engine_version.clone(),
            port: self.port,
            database_name: self.database_name.clone(),
            option_group: self.option_group.clone(),
            vpc_security_group_ids: self.vpc_security_group_ids.clone(),
            availability_zones: self.availability_zones.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Build the restore request from the explicitly-set overrides.
    pub fn restore_request(&self, snapshot_arn: &str) -> RestoreClusterRequest {
        RestoreClusterRequest {
            cluster_id: self.cluster_id.clone(),
            snapshot_arn: snapshot_arn.to_string(),
            engine: self.engine.to_string(),
            subnet_group: self.subnet_group(),
            engine_version: self.engine_version.clone(),
            port: self.port,
            database_name: self.database_name.clone(),
            option_group: self.option_group.clone(),
            vpc_security_group_ids: self.vpc_security_group_ids.clone(),
            availability_zones: self.availability_zones.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Wait deadline for this reconciliation: the caller's override when
    /// given, otherwise the operation-specific default (restores get the
    /// long deadline).
    pub fn wait_deadline(&self, override_secs: Option<u64>) -> Duration {
        match override_secs {
            Some(secs) => Duration::from_secs(secs),
            None if self.snapshot_arn.is_some() => DEFAULT_RESTORE_WAIT,
            None => DEFAULT_CLUSTER_WAIT,
        }
    }
}

/// Desired state of an Aurora cluster instance
#[derive(Debug, Clone, Default)]
pub struct InstanceConfig {
    pub instance_id: String,
    /// Cluster membership; only applies when the instance does not exist
    pub cluster_id: Option<String>,
    pub engine: Engine,
    pub subnet_group: Option<String>,
    pub instance_type: Option<String>,
    /// Fixed at creation; never part of a mutation set
    pub availability_zone: Option<String>,
    pub preferred_maintenance_window: Option<String>,
    pub parameter_group: Option<String>,
    pub multi_az: Option<bool>,
    pub auto_minor_version_upgrade: Option<bool>,
    pub option_group: Option<String>,
    pub publicly_accessible: Option<bool>,
    pub copy_tags_to_snapshot: Option<bool>,
    pub monitoring_interval: Option<i32>,
    pub monitoring_role_arn: Option<String>,
    pub promotion_tier: Option<i32>,
    pub performance_insights: Option<bool>,
    pub cloudwatch_logs_exports: Option<Vec<String>>,
    pub tags: Option<BTreeMap<String, String>>,
    /// Behavior flag for modifications: apply now instead of during the next
    /// maintenance window. Never diffed.
    pub apply_immediately: bool,
}

impl InstanceConfig {
    /// Reject malformed option combinations before any remote call.
    pub fn validate(&self, _state: State) -> Result<(), ValidationError> {
        if self.multi_az == Some(true) && self.availability_zone.is_some() {
            return Err(ValidationError::MultiAzWithAvailabilityZone);
        }
        if let Some(interval) = self.monitoring_interval {
            if !VALID_MONITORING_INTERVALS.contains(&interval) {
                return Err(ValidationError::InvalidMonitoringInterval(interval));
            }
            if interval > 0 && self.monitoring_role_arn.is_none() {
                return Err(ValidationError::MissingMonitoringRole);
            }
        }
        Ok(())
    }

    /// Build the create request from the explicitly-set fields.
    pub fn create_request(&self) -> CreateInstanceRequest {
        CreateInstanceRequest {
            instance_id: self.instance_id.clone(),
            engine: self.engine.to_string(),
            cluster_id: self.cluster_id.clone(),
            subnet_group: self.subnet_group.clone(),
            instance_type: self.instance_type.clone(),
            availability_zone: self.availability_zone.clone(),
            preferred_maintenance_window: self.preferred_maintenance_window.clone(),
            parameter_group: self.parameter_group.clone(),
            multi_az: self.multi_az,
            auto_minor_version_upgrade: self.auto_minor_version_upgrade,
            option_group: self.option_group.clone(),
            publicly_accessible: self.publicly_accessible,
            copy_tags_to_snapshot: self.copy_tags_to_snapshot,
            monitoring_interval: self.monitoring_interval,
            monitoring_role_arn: self.monitoring_role_arn.clone(),
            promotion_tier: self.promotion_tier,
            performance_insights: self.performance_insights,
            cloudwatch_logs_exports: self.cloudwatch_logs_exports.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Wait deadline for this reconciliation.
    pub fn wait_deadline(&self, override_secs: Option<u64>) -> Duration {
        override_secs.map_or(DEFAULT_INSTANCE_WAIT, Duration::from_secs)
    }
}
