//! DB cluster instance reconciliation

use super::{sets_differ, sync_tags, Action, Reconciled};
use crate::aws::error::RdsError;
use crate::aws::rds::{
    DbInstance, InstanceMutation, InstanceOperations, LogExportsDelta, TagOperations,
};
use crate::config::InstanceConfig;
use tracing::{debug, info};

/// Compute the minimal mutation set for an existing instance.
///
/// Comparison rules:
/// - the parameter group compares against the remote association list, which
///   must be exactly `[desired]`;
/// - performance insights compares against the remote
///   `PerformanceInsightsEnabled` field;
/// - CloudWatch log exports compare as unordered sets, producing an
///   enable/disable delta when they differ;
/// - everything else by direct equality.
pub fn diff_instance(desired: &InstanceConfig, current: &DbInstance) -> InstanceMutation {
    let mut mutation = InstanceMutation::default();

    if let Some(instance_type) = &desired.instance_type {
        if current.instance_type.as_deref() != Some(instance_type.as_str()) {
            mutation.instance_type = Some(instance_type.clone());
        }
    }
    if let Some(window) = &desired.preferred_maintenance_window {
        if current.preferred_maintenance_window.as_deref() != Some(window.as_str()) {
            mutation.preferred_maintenance_window = Some(window.clone());
        }
    }
    if let Some(parameter_group) = &desired.parameter_group {
        if current.parameter_group_names != [parameter_group.clone()] {
            mutation.parameter_group = Some(parameter_group.clone());
        }
    }
    if let Some(multi_az) = desired.multi_az {
        if current.multi_az != Some(multi_az) {
            mutation.multi_az = Some(multi_az);
        }
    }
    if let Some(upgrade) = desired.auto_minor_version_upgrade {
        if current.auto_minor_version_upgrade != Some(upgrade) {
            mutation.auto_minor_version_upgrade = Some(upgrade);
        }
    }
    if let Some(option_group) = &desired.option_group {
        if current.option_group.as_deref() != Some(option_group.as_str()) {
            mutation.option_group = Some(option_group.clone());
        }
    }
    if let Some(public) = desired.publicly_accessible {
        if current.publicly_accessible != Some(public) {
            mutation.publicly_accessible = Some(public);
        }
    }
    if let Some(copy_tags) = desired.copy_tags_to_snapshot {
        if current.copy_tags_to_snapshot != Some(copy_tags) {
            mutation.copy_tags_to_snapshot = Some(copy_tags);
        }
    }
    if let Some(interval) = desired.monitoring_interval {
        if current.monitoring_interval != Some(interval) {
            mutation.monitoring_interval = Some(interval);
        }
    }
    if let Some(role) = &desired.monitoring_role_arn {
        if current.monitoring_role_arn.as_deref() != Some(role.as_str()) {
            mutation.monitoring_role_arn = Some(role.clone());
        }
    }
    if let Some(tier) = desired.promotion_tier {
        if current.promotion_tier != Some(tier) {
            mutation.promotion_tier = Some(tier);
        }
    }
    if let Some(insights) = desired.performance_insights {
        if current.performance_insights_enabled != Some(insights) {
            mutation.performance_insights = Some(insights);
        }
    }
    if let Some(exports) = &desired.cloudwatch_logs_exports {
        if sets_differ(exports, &current.cloudwatch_logs_exports) {
            mutation.cloudwatch_logs_exports =
                Some(log_exports_delta(exports, &current.cloudwatch_logs_exports));
        }
    }

    mutation
}

/// Split a desired log export set against the current one into the
/// enable/disable halves the modify API expects.
fn log_exports_delta(desired: &[String], current: &[String]) -> LogExportsDelta {
    LogExportsDelta {
        enable: desired
            .iter()
            .filter(|e| !current.contains(e))
            .cloned()
            .collect(),
        disable: current
            .iter()
            .filter(|e| !desired.contains(e))
            .cloned()
            .collect(),
    }
}

/// Converge a cluster instance to the desired configuration.
pub async fn ensure_present<G>(
    gateway: &G,
    config: &InstanceConfig,
) -> Result<Reconciled<DbInstance>, RdsError>
where
    G: InstanceOperations + TagOperations,
{
    match gateway.describe_instance(&config.instance_id).await {
        Ok(current) => {
            let mutation = diff_instance(config, &current);
            let arn = current.arn.clone();

            let reconciled = if mutation.is_empty() {
                debug!(instance_id = %config.instance_id, "Instance already converged");
                Reconciled {
                    resource: current,
                    action: Action::Unchanged,
                }
            } else {
                let modified = gateway
                    .modify_instance(&config.instance_id, mutation, config.apply_immediately)
                    .await?;
                Reconciled {
                    resource: modified,
                    action: Action::Modified,
                }
            };

            sync_tags(gateway, &arn, config.tags.as_ref()).await?;
            Ok(reconciled)
        }
        Err(e) if e.is_not_found() => {
            let resource = gateway.create_instance(config.create_request()).await?;
            info!(instance_id = %config.instance_id, "Instance created");
            Ok(Reconciled {
                resource,
                action: Action::Created,
            })
        }
        Err(e) => Err(e),
    }
}

/// Delete an instance, treating "already absent" as success.
pub async fn ensure_absent<G: InstanceOperations>(
    gateway: &G,
    instance_id: &str,
) -> Result<Reconciled<Option<DbInstance>>, RdsError> {
    match gateway.delete_instance(instance_id).await {
        Ok(deleted) => Ok(Reconciled {
            resource: Some(deleted),
            action: Action::Deleted,
        }),
        Err(e) if e.is_not_found() => {
            debug!(instance_id = %instance_id, "Instance already absent");
            Ok(Reconciled {
                resource: None,
                action: Action::Unchanged,
            })
        }
        Err(e) => Err(e),
    }
}
