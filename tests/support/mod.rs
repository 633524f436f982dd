//! In-memory RDS gateway fake for reconciler tests
//!
//! `FakeRds` implements the operations traits over mutexed maps, records
//! every call, and can be scripted to fail specific operations. Create and
//! modify calls materialize resource views the way the live gateway would,
//! so the reconcilers see consistent state across passes.

#![allow(dead_code)]

use auroractl::aws::rds::{
    ClusterMutation, ClusterOperations, ClusterSnapshot, CreateClusterRequest,
    CreateInstanceRequest, DbCluster, DbInstance, InstanceMutation, InstanceOperations,
    RestoreClusterRequest, SnapshotFilter, SnapshotOperations, TagOperations,
};
use auroractl::aws::RdsError;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

/// Every gateway invocation, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DescribeCluster(String),
    CreateCluster(CreateClusterRequest),
    RestoreCluster(RestoreClusterRequest),
    ModifyCluster(String, ClusterMutation),
    DeleteCluster(String),
    DescribeInstance(String),
    CreateInstance(CreateInstanceRequest),
    ModifyInstance(String, InstanceMutation, bool),
    DeleteInstance(String),
    DescribeSnapshots(SnapshotFilter),
    ListTags(String),
    AddTags(String, BTreeMap<String, String>),
    RemoveTags(String, Vec<String>),
}

#[derive(Default)]
pub struct FakeRds {
    clusters: Mutex<HashMap<String, DbCluster>>,
    instances: Mutex<HashMap<String, DbInstance>>,
    snapshots: Mutex<Vec<ClusterSnapshot>>,
    tags: Mutex<HashMap<String, BTreeMap<String, String>>>,
    calls: Mutex<Vec<Call>>,
    errors: Mutex<HashMap<&'static str, VecDeque<RdsError>>>,
}

impl FakeRds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(self, cluster: DbCluster) -> Self {
        self.clusters
            .lock()
            .unwrap()
            .insert(cluster.cluster_id.clone(), cluster);
        self
    }

    pub fn with_instance(self, instance: DbInstance) -> Self {
        self.instances
            .lock()
            .unwrap()
            .insert(instance.instance_id.clone(), instance);
        self
    }

    pub fn with_snapshot(self, snapshot: ClusterSnapshot) -> Self {
        self.snapshots.lock().unwrap().push(snapshot);
        self
    }

    pub fn with_tags(self, arn: &str, tags: BTreeMap<String, String>) -> Self {
        self.tags.lock().unwrap().insert(arn.to_string(), tags);
        self
    }

    /// Script the next invocation of `op` to fail with `err`. Repeated
    /// scripts for the same operation fail in FIFO order.
    pub fn fail_next(&self, op: &'static str, err: RdsError) {
        self.errors
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tags_on(&self, arn: &str) -> BTreeMap<String, String> {
        self.tags
            .lock()
            .unwrap()
            .get(arn)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_error(&self, op: &'static str) -> Option<RdsError> {
        self.errors
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(VecDeque::pop_front)
    }
}

/// A cluster view in the shape a fresh describe would report
pub fn sample_cluster(cluster_id: &str) -> DbCluster {
    DbCluster {
        cluster_id: cluster_id.to_string(),
        arn: format!("arn:aws:rds:us-east-1:123456789012:cluster:{cluster_id}"),
        status: "available".to_string(),
        engine: Some("aurora".to_string()),
        engine_version: Some("5.6.10a".to_string()),
        port: Some(3306),
        database_name: None,
        subnet_group: Some("subnets".to_string()),
        option_group: Some("default:aurora-5-6".to_string()),
        vpc_security_group_ids: vec!["sg-1".to_string()],
        availability_zones: vec!["us-east-1a".to_string()],
        master_username: Some("admin".to_string()),
        endpoint: Some(format!("{cluster_id}.cluster.example.com")),
        reader_endpoint: None,
        multi_az: Some(false),
        cluster_members: vec![],
        created_at: None,
    }
}

pub fn sample_instance(instance_id: &str) -> DbInstance {
    DbInstance {
        instance_id: instance_id.to_string(),
        arn: format!("arn:aws:rds:us-east-1:123456789012:db:{instance_id}"),
        status: "available".to_string(),
        cluster_id: Some("c1".to_string()),
        engine: Some("aurora".to_string()),
        instance_type: Some("db.t2.small".to_string()),
        availability_zone: Some("us-east-1a".to_string()),
        subnet_group: Some("subnets".to_string()),
        parameter_group_names: vec!["default.aurora5.6".to_string()],
        option_group: Some("default:aurora-5-6".to_string()),
        preferred_maintenance_window: Some("mon:22:00-mon:23:15".to_string()),
        multi_az: Some(false),
        auto_minor_version_upgrade: Some(true),
        publicly_accessible: Some(false),
        copy_tags_to_snapshot: Some(false),
        monitoring_interval: Some(0),
        monitoring_role_arn: None,
        promotion_tier: Some(1),
        performance_insights_enabled: Some(false),
        cloudwatch_logs_exports: vec![],
        endpoint: Some(format!("{instance_id}.example.com")),
        created_at: None,
    }
}

pub fn sample_snapshot(snapshot_id: &str, cluster_id: &str) -> ClusterSnapshot {
    ClusterSnapshot {
        snapshot_id: snapshot_id.to_string(),
        cluster_id: cluster_id.to_string(),
        arn: format!("arn:aws:rds:us-east-1:123456789012:cluster-snapshot:{snapshot_id}"),
        status: Some("available".to_string()),
        snapshot_type: Some("manual".to_string()),
        engine: Some("aurora".to_string()),
        engine_version: Some("5.6.10a".to_string()),
        port: Some(3306),
        vpc_id: Some("vpc-1".to_string()),
        availability_zones: vec!["us-east-1a".to_string()],
        allocated_storage: Some(1),
        master_username: Some("admin".to_string()),
        license_model: None,
        percent_progress: Some(100),
        storage_encrypted: Some(false),
        iam_database_authentication_enabled: Some(false),
        kms_key_id: None,
        source_snapshot_arn: None,
        snapshot_create_time: None,
        cluster_create_time: None,
    }
}

fn cluster_from_create(request: &CreateClusterRequest) -> DbCluster {
    DbCluster {
        cluster_id: request.cluster_id.clone(),
        arn: format!(
            "arn:aws:rds:us-east-1:123456789012:cluster:{}",
            request.cluster_id
        ),
        status: "creating".to_string(),
        engine: Some(request.engine.clone()),
        engine_version: request.engine_version.clone(),
        port: request.port,
        database_name: request.database_name.clone(),
        subnet_group: Some(request.subnet_group.clone()),
        option_group: request.option_group.clone(),
        vpc_security_group_ids: request.vpc_security_group_ids.clone().unwrap_or_default(),
        availability_zones: request.availability_zones.clone().unwrap_or_default(),
        master_username: request.master_username.clone(),
        endpoint: None,
        reader_endpoint: None,
        multi_az: None,
        cluster_members: vec![],
        created_at: None,
    }
}

fn instance_from_create(request: &CreateInstanceRequest) -> DbInstance {
    DbInstance {
        instance_id: request.instance_id.clone(),
        arn: format!(
            "arn:aws:rds:us-east-1:123456789012:db:{}",
            request.instance_id
        ),
        status: "creating".to_string(),
        cluster_id: request.cluster_id.clone(),
        engine: Some(request.engine.clone()),
        instance_type: request.instance_type.clone(),
        availability_zone: request.availability_zone.clone(),
        subnet_group: request.subnet_group.clone(),
        parameter_group_names: request.parameter_group.clone().into_iter().collect(),
        option_group: request.option_group.clone(),
        preferred_maintenance_window: request.preferred_maintenance_window.clone(),
        multi_az: request.multi_az,
        auto_minor_version_upgrade: request.auto_minor_version_upgrade,
        publicly_accessible: request.publicly_accessible,
        copy_tags_to_snapshot: request.copy_tags_to_snapshot,
        monitoring_interval: request.monitoring_interval,
        monitoring_role_arn: request.monitoring_role_arn.clone(),
        promotion_tier: request.promotion_tier,
        performance_insights_enabled: request.performance_insights,
        cloudwatch_logs_exports: request.cloudwatch_logs_exports.clone().unwrap_or_default(),
        endpoint: None,
        created_at: None,
    }
}

fn apply_cluster_mutation(cluster: &mut DbCluster, mutation: &ClusterMutation) {
    if let Some(version) = &mutation.engine_version {
        cluster.engine_version = Some(version.clone());
    }
    if let Some(port) = mutation.port {
        cluster.port = Some(port);
    }
    if let Some(option_group) = &mutation.option_group {
        cluster.option_group = Some(option_group.clone());
    }
    if let Some(groups) = &mutation.vpc_security_group_ids {
        cluster.vpc_security_group_ids = groups.clone();
    }
}

fn apply_instance_mutation(instance: &mut DbInstance, mutation: &InstanceMutation) {
    if let Some(instance_type) = &mutation.instance_type {
        instance.instance_type = Some(instance_type.clone());
    }
    if let Some(window) = &mutation.preferred_maintenance_window {
        instance.preferred_maintenance_window = Some(window.clone());
    }
    if let Some(parameter_group) = &mutation.parameter_group {
        instance.parameter_group_names = vec![parameter_group.clone()];
    }
    if let Some(multi_az) = mutation.multi_az {
        instance.multi_az = Some(multi_az);
    }
    if let Some(upgrade) = mutation.auto_minor_version_upgrade {
        instance.auto_minor_version_upgrade = Some(upgrade);
    }
    if let Some(option_group) = &mutation.option_group {
        instance.option_group = Some(option_group.clone());
    }
    if let Some(public) = mutation.publicly_accessible {
        instance.publicly_accessible = Some(public);
    }
    if let Some(copy_tags) = mutation.copy_tags_to_snapshot {
        instance.copy_tags_to_snapshot = Some(copy_tags);
    }
    if let Some(interval) = mutation.monitoring_interval {
        instance.monitoring_interval = Some(interval);
    }
    if let Some(role) = &mutation.monitoring_role_arn {
        instance.monitoring_role_arn = Some(role.clone());
    }
    if let Some(tier) = mutation.promotion_tier {
        instance.promotion_tier = Some(tier);
    }
    if let Some(insights) = mutation.performance_insights {
        instance.performance_insights_enabled = Some(insights);
    }
    if let Some(delta) = &mutation.cloudwatch_logs_exports {
        instance
            .cloudwatch_logs_exports
            .retain(|e| !delta.disable.contains(e));
        instance
            .cloudwatch_logs_exports
            .extend(delta.enable.iter().cloned());
    }
}

fn cluster_not_found(cluster_id: &str) -> RdsError {
    RdsError::NotFound {
        resource_type: "DB cluster",
        resource_id: cluster_id.to_string(),
    }
}

fn instance_not_found(instance_id: &str) -> RdsError {
    RdsError::NotFound {
        resource_type: "DB instance",
        resource_id: instance_id.to_string(),
    }
}

impl ClusterOperations for FakeRds {
    async fn describe_cluster(&self, cluster_id: &str) -> Result<DbCluster, RdsError> {
        self.record(Call::DescribeCluster(cluster_id.to_string()));
        if let Some(err) = self.take_error("describe_cluster") {
            return Err(err);
        }
        self.clusters
            .lock()
            .unwrap()
            .get(cluster_id)
            .cloned()
            .ok_or_else(|| cluster_not_found(cluster_id))
    }

    async fn create_cluster(&self, request: CreateClusterRequest) -> Result<DbCluster, RdsError> {
        self.record(Call::CreateCluster(request.clone()));
        if let Some(err) = self.take_error("create_cluster") {
            return Err(err);
        }
        let cluster = cluster_from_create(&request);
        self.clusters
            .lock()
            .unwrap()
            .insert(cluster.cluster_id.clone(), cluster.clone());
        if let Some(tags) = &request.tags {
            self.tags
                .lock()
                .unwrap()
                .insert(cluster.arn.clone(), tags.clone());
        }
        Ok(cluster)
    }

    async fn restore_cluster_from_snapshot(
        &self,
        request: RestoreClusterRequest,
    ) -> Result<DbCluster, RdsError> {
        self.record(Call::RestoreCluster(request.clone()));
        if let Some(err) = self.take_error("restore_cluster_from_snapshot") {
            return Err(err);
        }
        let mut cluster = sample_cluster(&request.cluster_id);
        cluster.status = "creating".to_string();
        cluster.engine = Some(request.engine.clone());
        self.clusters
            .lock()
            .unwrap()
            .insert(cluster.cluster_id.clone(), cluster.clone());
        Ok(cluster)
    }

    async fn modify_cluster(
        &self,
        cluster_id: &str,
        mutation: ClusterMutation,
    ) -> Result<DbCluster, RdsError> {
        self.record(Call::ModifyCluster(cluster_id.to_string(), mutation.clone()));
        if let Some(err) = self.take_error("modify_cluster") {
            return Err(err);
        }
        let mut clusters = self.clusters.lock().unwrap();
        let cluster = clusters
            .get_mut(cluster_id)
            .ok_or_else(|| cluster_not_found(cluster_id))?;
        apply_cluster_mutation(cluster, &mutation);
        Ok(cluster.clone())
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<DbCluster, RdsError> {
        self.record(Call::DeleteCluster(cluster_id.to_string()));
        if let Some(err) = self.take_error("delete_cluster") {
            return Err(err);
        }
        self.clusters
            .lock()
            .unwrap()
            .remove(cluster_id)
            .ok_or_else(|| cluster_not_found(cluster_id))
    }
}

impl InstanceOperations for FakeRds {
    async fn describe_instance(&self, instance_id: &str) -> Result<DbInstance, RdsError> {
        self.record(Call::DescribeInstance(instance_id.to_string()));
        if let Some(err) = self.take_error("describe_instance") {
            return Err(err);
        }
        self.instances
            .lock()
            .unwrap()
            .get(instance_id)
            .cloned()
            .ok_or_else(|| instance_not_found(instance_id))
    }

    async fn create_instance(
        &self,
        request: CreateInstanceRequest,
    ) -> Result<DbInstance, RdsError> {
        self.record(Call::CreateInstance(request.clone()));
        if let Some(err) = self.take_error("create_instance") {
            return Err(err);
        }
        let instance = instance_from_create(&request);
        self.instances
            .lock()
            .unwrap()
            .insert(instance.instance_id.clone(), instance.clone());
        if let Some(tags) = &request.tags {
            self.tags
                .lock()
                .unwrap()
                .insert(instance.arn.clone(), tags.clone());
        }
        Ok(instance)
    }

    async fn modify_instance(
        &self,
        instance_id: &str,
        mutation: InstanceMutation,
        apply_immediately: bool,
    ) -> Result<DbInstance, RdsError> {
        self.record(Call::ModifyInstance(
            instance_id.to_string(),
            mutation.clone(),
            apply_immediately,
        ));
        if let Some(err) = self.take_error("modify_instance") {
            return Err(err);
        }
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(instance_id)
            .ok_or_else(|| instance_not_found(instance_id))?;
        apply_instance_mutation(instance, &mutation);
        Ok(instance.clone())
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<DbInstance, RdsError> {
        self.record(Call::DeleteInstance(instance_id.to_string()));
        if let Some(err) = self.take_error("delete_instance") {
            return Err(err);
        }
        self.instances
            .lock()
            .unwrap()
            .remove(instance_id)
            .ok_or_else(|| instance_not_found(instance_id))
    }
}

impl SnapshotOperations for FakeRds {
    async fn describe_cluster_snapshots(
        &self,
        filter: SnapshotFilter,
    ) -> Result<Vec<ClusterSnapshot>, RdsError> {
        self.record(Call::DescribeSnapshots(filter.clone()));
        if let Some(err) = self.take_error("describe_cluster_snapshots") {
            return Err(err);
        }
        let snapshots = self.snapshots.lock().unwrap();
        Ok(snapshots
            .iter()
            .filter(|s| {
                filter
                    .snapshot_id
                    .as_ref()
                    .map_or(true, |id| &s.snapshot_id == id)
            })
            .filter(|s| {
                filter
                    .cluster_id
                    .as_ref()
                    .map_or(true, |id| &s.cluster_id == id)
            })
            .filter(|s| {
                filter
                    .snapshot_type
                    .as_ref()
                    .map_or(true, |t| s.snapshot_type.as_ref() == Some(t))
            })
            .cloned()
            .collect())
    }
}

impl TagOperations for FakeRds {
    async fn list_tags(&self, arn: &str) -> Result<BTreeMap<String, String>, RdsError> {
        self.record(Call::ListTags(arn.to_string()));
        if let Some(err) = self.take_error("list_tags") {
            return Err(err);
        }
        Ok(self.tags_on(arn))
    }

    async fn add_tags(&self, arn: &str, tags: &BTreeMap<String, String>) -> Result<(), RdsError> {
        self.record(Call::AddTags(arn.to_string(), tags.clone()));
        if let Some(err) = self.take_error("add_tags") {
            return Err(err);
        }
        self.tags
            .lock()
            .unwrap()
            .entry(arn.to_string())
            .or_default()
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn remove_tags(&self, arn: &str, keys: &[String]) -> Result<(), RdsError> {
        self.record(Call::RemoveTags(arn.to_string(), keys.to_vec()));
        if let Some(err) = self.take_error("remove_tags") {
            return Err(err);
        }
        if let Some(tags) = self.tags.lock().unwrap().get_mut(arn) {
            for key in keys {
                tags.remove(key);
            }
        }
        Ok(())
    }
}
