//! DB cluster instance call sites

use super::types::{api_args, CreateInstanceRequest, DbInstance, InstanceMutation};
use super::RdsClient;
use crate::aws::error::{classify_sdk_error, RdsError};
use crate::aws::rds::tags::to_sdk_tags;
use tracing::{debug, info};

impl RdsClient {
    /// Fetch an instance by identifier. Only the service's not-found fault
    /// signals absence; an empty result set is surfaced as an API error.
    pub(crate) async fn describe_instance(&self, instance_id: &str) -> Result<DbInstance, RdsError> {
        debug!(instance_id = %instance_id, "Describing DB instance");

        let output = self
            .client
            .describe_db_instances()
            .db_instance_identifier(instance_id)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    "DescribeDBInstances",
                    instance_id,
                    e,
                    api_args(&serde_json::json!({ "DBInstanceIdentifier": instance_id })),
                )
            })?;

        super::sole_record(
            output.db_instances().first().map(DbInstance::from_sdk),
            "DescribeDBInstances",
            instance_id,
        )
    }

    /// Create a new cluster instance.
    pub(crate) async fn create_instance(
        &self,
        request: CreateInstanceRequest,
    ) -> Result<DbInstance, RdsError> {
        info!(
            instance_id = %request.instance_id,
            cluster_id = request.cluster_id.as_deref().unwrap_or("<none>"),
            "Creating DB instance"
        );
        let args = api_args(&request);

        let output = self
            .client
            .create_db_instance()
            .db_instance_identifier(&request.instance_id)
            .engine(&request.engine)
            .set_db_cluster_identifier(request.cluster_id.clone())
            .set_db_subnet_group_name(request.subnet_group.clone())
            .set_db_instance_class(request.instance_type.clone())
            .set_availability_zone(request.availability_zone.clone())
            .set_preferred_maintenance_window(request.preferred_maintenance_window.clone())
            .set_db_parameter_group_name(request.parameter_group.clone())
            .set_multi_az(request.multi_az)
            .set_auto_minor_version_upgrade(request.auto_minor_version_upgrade)
            .set_option_group_name(request.option_group.clone())
            .set_publicly_accessible(request.publicly_accessible)
            .set_copy_tags_to_snapshot(request.copy_tags_to_snapshot)
            .set_monitoring_interval(request.monitoring_interval)
            .set_monitoring_role_arn(request.monitoring_role_arn.clone())
            .set_promotion_tier(request.promotion_tier)
            .set_enable_performance_insights(request.performance_insights)
            .set_enable_cloudwatch_logs_exports(request.cloudwatch_logs_exports.clone())
            .set_tags(request.tags.as_ref().map(to_sdk_tags))
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error("CreateDBInstance", &request.instance_id, e, args.clone())
            })?;

        output
            .db_instance()
            .map(DbInstance::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "CreateDBInstance",
                code: None,
                message: "response contained no DB instance".to_string(),
                api_args: args,
            })
    }

    /// Apply a mutation set to an existing instance. Callers guarantee the
    /// mutation is non-empty; `apply_immediately` is a behavior flag, not an
    /// instance attribute.
    pub(crate) async fn modify_instance(
        &self,
        instance_id: &str,
        mutation: InstanceMutation,
        apply_immediately: bool,
    ) -> Result<DbInstance, RdsError> {
        info!(
            instance_id = %instance_id,
            apply_immediately,
            mutation = ?mutation,
            "Modifying DB instance"
        );
        let args = api_args(&mutation);

        let log_exports = mutation.cloudwatch_logs_exports.as_ref().map(|delta| {
            aws_sdk_rds::types::CloudwatchLogsExportConfiguration::builder()
                .set_enable_log_types(Some(delta.enable.clone()))
                .set_disable_log_types(Some(delta.disable.clone()))
                .build()
        });

        let output = self
            .client
            .modify_db_instance()
            .db_instance_identifier(instance_id)
            .apply_immediately(apply_immediately)
            .set_db_instance_class(mutation.instance_type.clone())
            .set_preferred_maintenance_window(mutation.preferred_maintenance_window.clone())
            .set_db_parameter_group_name(mutation.parameter_group.clone())
            .set_multi_az(mutation.multi_az)
            .set_auto_minor_version_upgrade(mutation.auto_minor_version_upgrade)
            .set_option_group_name(mutation.option_group.clone())
            .set_publicly_accessible(mutation.publicly_accessible)
            .set_copy_tags_to_snapshot(mutation.copy_tags_to_snapshot)
            .set_monitoring_interval(mutation.monitoring_interval)
            .set_monitoring_role_arn(mutation.monitoring_role_arn.clone())
            .set_promotion_tier(mutation.promotion_tier)
            .set_enable_performance_insights(mutation.performance_insights)
            .set_cloudwatch_logs_export_configuration(log_exports)
            .send()
            .await
            .map_err(|e| classify_sdk_error("ModifyDBInstance", instance_id, e, args.clone()))?;

        output
            .db_instance()
            .map(DbInstance::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "ModifyDBInstance",
                code: None,
                message: "response contained no DB instance".to_string(),
                api_args: args,
            })
    }

    /// Delete an instance, skipping the final snapshot.
    pub(crate) async fn delete_instance(&self, instance_id: &str) -> Result<DbInstance, RdsError> {
        info!(instance_id = %instance_id, "Deleting DB instance");
        let args = api_args(&serde_json::json!({
            "DBInstanceIdentifier": instance_id,
            "SkipFinalSnapshot": true,
        }));

        let output = self
            .client
            .delete_db_instance()
            .db_instance_identifier(instance_id)
            .skip_final_snapshot(true)
            .send()
            .await
            .map_err(|e| classify_sdk_error("DeleteDBInstance", instance_id, e, args.clone()))?;

        output
            .db_instance()
            .map(DbInstance::from_sdk)
            .ok_or_else(|| RdsError::Api {
                op: "DeleteDBInstance",
                code: None,
                message: "response contained no DB instance".to_string(),
                api_args: args,
            })
    }
}
