//! auroractl: declarative management of RDS Aurora clusters and instances
//!
//! Each subcommand runs one idempotent reconciliation (or snapshot search)
//! and prints the resulting resource as JSON on stdout. Logs go to stderr.

use anyhow::Result;
use auroractl::aws::rds::{ClusterOperations, ClusterSnapshot, InstanceOperations};
use auroractl::aws::{get_current_account_id, AwsContext, FromAwsContext, RdsClient, RdsError};
use auroractl::config::{ClusterConfig, Engine, InstanceConfig, State};
use auroractl::reconcile::{self, Reconciled};
use auroractl::snapshots::{self, SnapshotQuery, SnapshotType, SortKey, SortOrder};
use auroractl::wait::{wait_until_available, WaitConfig, WaitError};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "auroractl")]
#[command(about = "Declarative reconciliation of RDS Aurora clusters, instances, and snapshots")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile a DB cluster to the desired state
    Cluster(ClusterArgs),

    /// Reconcile a DB cluster instance to the desired state
    Instance(InstanceArgs),

    /// Search DB cluster snapshots
    Snapshots(SnapshotArgs),
}

/// Arguments shared by every subcommand
#[derive(clap::Args, Debug)]
struct AwsArgs {
    /// AWS region
    #[arg(long, default_value = "us-east-1")]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long)]
    profile: Option<String>,
}

#[derive(clap::Args, Debug)]
struct ClusterArgs {
    /// Cluster identifier
    #[arg(long)]
    cluster_id: String,

    /// ARN of a snapshot to restore from when the cluster does not exist
    #[arg(long)]
    snapshot_arn: Option<String>,

    /// Database engine
    #[arg(long, value_enum, default_value_t = Engine::Aurora)]
    engine: Engine,

    /// Engine version (defaults to the engine's current version, or the
    /// snapshot's when restoring)
    #[arg(long)]
    engine_version: Option<String>,

    /// Master username (direct creation only)
    #[arg(long)]
    master_username: Option<String>,

    /// Master password (direct creation only)
    #[arg(long, env = "AURORACTL_MASTER_PASSWORD", hide_env_values = true)]
    master_password: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<i32>,

    /// DB subnet group (required for state=present)
    #[arg(long)]
    subnet_group: Option<String>,

    /// Database name to create in a new cluster
    #[arg(long)]
    database_name: Option<String>,

    /// Option group to associate
    #[arg(long)]
    option_group: Option<String>,

    /// VPC security group IDs, comma-separated
    #[arg(long, value_delimiter = ',')]
    security_group_ids: Option<Vec<String>>,

    /// Availability zones, comma-separated
    #[arg(long, value_delimiter = ',')]
    availability_zones: Option<Vec<String>>,

    /// Resource tag as KEY=VALUE (repeatable)
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,

    /// Desired state
    #[arg(long, value_enum, default_value_t = State::Present)]
    state: State,

    /// Wait for the cluster to become available
    #[arg(long)]
    wait: bool,

    /// Wait deadline in seconds (default: 600 for create/modify, 3600 for
    /// snapshot restore)
    #[arg(long)]
    wait_timeout: Option<u64>,

    #[command(flatten)]
    aws: AwsArgs,
}

impl From<&ClusterArgs> for ClusterConfig {
    fn from(args: &ClusterArgs) -> Self {
        Self {
            cluster_id: args.cluster_id.clone(),
            snapshot_arn: args.snapshot_arn.clone(),
            engine: args.engine,
            engine_version: args.engine_version.clone(),
            master_username: args.master_username.clone(),
            master_password: args.master_password.clone(),
            port: args.port,
            subnet_group: args.subnet_group.clone(),
            database_name: args.database_name.clone(),
            option_group: args.option_group.clone(),
            vpc_security_group_ids: args.security_group_ids.clone(),
            availability_zones: args.availability_zones.clone(),
            tags: tag_map(&args.tags),
        }
    }
}

#[derive(clap::Args, Debug)]
struct InstanceArgs {
    /// Instance identifier
    #[arg(long)]
    instance_id: String,

    /// Cluster the instance belongs to (creation only)
    #[arg(long)]
    cluster_id: Option<String>,

    /// Database engine
    #[arg(long, value_enum, default_value_t = Engine::Aurora)]
    engine: Engine,

    /// DB subnet group (creation only)
    #[arg(long)]
    subnet_group: Option<String>,

    /// Instance class, e.g. db.r5.large
    #[arg(long)]
    instance_type: Option<String>,

    /// Availability zone (creation only; conflicts with --multi-az true)
    #[arg(long)]
    availability_zone: Option<String>,

    /// Maintenance window in ddd:hh24:mi-ddd:hh24:mi format
    #[arg(long)]
    preferred_maintenance_window: Option<String>,

    /// DB parameter group to associate
    #[arg(long)]
    parameter_group: Option<String>,

    /// Multi-AZ deployment
    #[arg(long)]
    multi_az: Option<bool>,

    /// Apply minor version upgrades automatically
    #[arg(long)]
    auto_minor_version_upgrade: Option<bool>,

    /// Option group to associate
    #[arg(long)]
    option_group: Option<String>,

    /// Whether the instance is publicly accessible
    #[arg(long)]
    publicly_accessible: Option<bool>,

    /// Copy instance tags to snapshots
    #[arg(long)]
    copy_tags_to_snapshot: Option<bool>,

    /// Enhanced monitoring interval in seconds (0 disables)
    #[arg(long)]
    monitoring_interval: Option<i32>,

    /// IAM role ARN for enhanced monitoring delivery
    #[arg(long)]
    monitoring_role_arn: Option<String>,

    /// Failover promotion order
    #[arg(long)]
    promotion_tier: Option<i32>,

    /// Enable Performance Insights
    #[arg(long)]
    performance_insights: Option<bool>,

    /// Log types to export to CloudWatch Logs, comma-separated
    #[arg(long, value_delimiter = ',')]
    cloudwatch_logs_exports: Option<Vec<String>>,

    /// Apply modifications immediately instead of during the next
    /// maintenance window
    #[arg(long)]
    apply_immediately: bool,

    /// Resource tag as KEY=VALUE (repeatable)
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,

    /// Desired state
    #[arg(long, value_enum, default_value_t = State::Present)]
    state: State,

    /// Wait for the instance to become available
    #[arg(long)]
    wait: bool,

    /// Wait deadline in seconds (default: 1200)
    #[arg(long)]
    wait_timeout: Option<u64>,

    #[command(flatten)]
    aws: AwsArgs,
}

impl From<&InstanceArgs> for InstanceConfig {
    fn from(args: &InstanceArgs) -> Self {
        Self {
            instance_id: args.instance_id.clone(),
            cluster_id: args.cluster_id.clone(),
            engine: args.engine,
            subnet_group: args.subnet_group.clone(),
            instance_type: args.instance_type.clone(),
            availability_zone: args.availability_zone.clone(),
            preferred_maintenance_window: args.preferred_maintenance_window.clone(),
            parameter_group: args.parameter_group.clone(),
            multi_az: args.multi_az,
            auto_minor_version_upgrade: args.auto_minor_version_upgrade,
            option_group: args.option_group.clone(),
            publicly_accessible: args.publicly_accessible,
            copy_tags_to_snapshot: args.copy_tags_to_snapshot,
            monitoring_interval: args.monitoring_interval,
            monitoring_role_arn: args.monitoring_role_arn.clone(),
            promotion_tier: args.promotion_tier,
            performance_insights: args.performance_insights,
            cloudwatch_logs_exports: args.cloudwatch_logs_exports.clone(),
            tags: tag_map(&args.tags),
            apply_immediately: args.apply_immediately,
        }
    }
}

/// Output format for snapshot listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(clap::Args, Debug)]
struct SnapshotArgs {
    /// Exact snapshot identifier (conflicts with --cluster-id)
    #[arg(long)]
    snapshot_id: Option<String>,

    /// Limit to snapshots of one cluster (conflicts with --snapshot-id)
    #[arg(long)]
    cluster_id: Option<String>,

    /// Snapshot type filter
    #[arg(long, value_enum)]
    snapshot_type: Option<SnapshotType>,

    /// Snapshot status filter (e.g. available, creating)
    #[arg(long)]
    status: Option<String>,

    /// Regular expression matched against the snapshot identifier
    #[arg(long)]
    id_regex: Option<String>,

    /// Maximum records returned by AWS per page
    #[arg(long)]
    max_records: Option<i32>,

    /// Sort key
    #[arg(long, value_enum)]
    sort: Option<SortKey>,

    /// Sort direction
    #[arg(long, value_enum, default_value_t = SortOrder::Ascending)]
    sort_order: SortOrder,

    /// First result to include (only when sorting)
    #[arg(long)]
    start: Option<usize>,

    /// Result to end before (only when sorting)
    #[arg(long)]
    end: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(flatten)]
    aws: AwsArgs,
}

impl From<&SnapshotArgs> for SnapshotQuery {
    fn from(args: &SnapshotArgs) -> Self {
        Self {
            snapshot_id: args.snapshot_id.clone(),
            cluster_id: args.cluster_id.clone(),
            snapshot_type: args.snapshot_type,
            status: args.status.clone(),
            id_regex: args.id_regex.clone(),
            max_records: args.max_records,
            sort: args.sort,
            sort_order: args.sort_order,
            start: args.start,
            end: args.end,
        }
    }
}

/// Parse a KEY=VALUE tag argument.
fn parse_tag(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("invalid tag '{s}', expected KEY=VALUE"))
}

/// Collect repeated --tag pairs into a map; no pairs means tags are unmanaged.
fn tag_map(tags: &[(String, String)]) -> Option<BTreeMap<String, String>> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.iter().cloned().collect())
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    // Echo the request that was being submitted when an RDS call failed
    if let Some(api_args) = e
        .chain()
        .find_map(|c| c.downcast_ref::<RdsError>().and_then(RdsError::api_args))
    {
        if let Ok(rendered) = serde_json::to_string_pretty(api_args) {
            let _ = writeln!(stderr, "\n\x1b[2mSubmitted API arguments:\x1b[0m\n{rendered}");
        }
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            signal_token.cancel();
        }
    });

    match args.command {
        Command::Cluster(cluster_args) => run_cluster(&cluster_args, &cancel).await,
        Command::Instance(instance_args) => run_instance(&instance_args, &cancel).await,
        Command::Snapshots(snapshot_args) => run_snapshots(&snapshot_args).await,
    }
}

/// Load SDK config, validate credentials, and build the RDS gateway.
async fn connect(aws: &AwsArgs) -> Result<RdsClient> {
    let ctx = AwsContext::with_profile(&aws.region, aws.profile.as_deref()).await;
    get_current_account_id(ctx.sdk_config()).await?;
    Ok(RdsClient::from_context(&ctx))
}

fn print_report<R: Serialize>(key: &str, outcome: &Reconciled<R>) -> Result<()> {
    let document = serde_json::json!({
        "changed": outcome.changed(),
        "created": outcome.created(),
        key: outcome.resource,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

fn print_absent_report<R: Serialize>(key: &str, outcome: &Reconciled<Option<R>>) -> Result<()> {
    let document = serde_json::json!({
        "changed": outcome.changed(),
        key: outcome.resource,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Report a wait failure, echoing the last observed resource state on timeout.
fn wait_failure<R: Serialize + std::fmt::Debug + Send + Sync + 'static>(
    err: WaitError<R>,
) -> anyhow::Error {
    if let Some(last) = err.last_seen() {
        if let Ok(rendered) = serde_json::to_string_pretty(last) {
            eprintln!("Last observed state:\n{rendered}");
        }
    }
    anyhow::Error::new(err)
}

async fn run_cluster(args: &ClusterArgs, cancel: &CancellationToken) -> Result<()> {
    let config = ClusterConfig::from(args);
    config.validate(args.state)?;
    let rds = connect(&args.aws).await?;

    match args.state {
        State::Present => {
            let mut outcome = reconcile::cluster::ensure_present(&rds, &config).await?;

            if args.wait {
                let deadline = config.wait_deadline(args.wait_timeout);
                let ready = wait_until_available(
                    WaitConfig::with_deadline(deadline),
                    Some(cancel),
                    || rds.describe_cluster(&config.cluster_id),
                    &config.cluster_id,
                )
                .await
                .map_err(wait_failure)?;
                outcome.resource = ready;
            }

            print_report("cluster", &outcome)
        }
        State::Absent => {
            let outcome = reconcile::cluster::ensure_absent(&rds, &config.cluster_id).await?;
            print_absent_report("cluster", &outcome)
        }
    }
}

async fn run_instance(args: &InstanceArgs, cancel: &CancellationToken) -> Result<()> {
    let config = InstanceConfig::from(args);
    config.validate(args.state)?;
    let rds = connect(&args.aws).await?;

    match args.state {
        State::Present => {
            let mut outcome = reconcile::instance::ensure_present(&rds, &config).await?;

            if args.wait {
                let deadline = config.wait_deadline(args.wait_timeout);
                let ready = wait_until_available(
                    WaitConfig::with_deadline(deadline),
                    Some(cancel),
                    || rds.describe_instance(&config.instance_id),
                    &config.instance_id,
                )
                .await
                .map_err(wait_failure)?;
                outcome.resource = ready;
            }

            print_report("instance", &outcome)
        }
        State::Absent => {
            let outcome = reconcile::instance::ensure_absent(&rds, &config.instance_id).await?;
            print_absent_report("instance", &outcome)
        }
    }
}

async fn run_snapshots(args: &SnapshotArgs) -> Result<()> {
    let query = SnapshotQuery::from(args);
    let rds = connect(&args.aws).await?;

    let results = snapshots::search(&rds, &query).await?;
    info!(count = results.len(), "Snapshot search complete");

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => println!("{}", snapshot_table(&results)),
    }
    Ok(())
}

/// Render a snapshot listing as a condensed table.
fn snapshot_table(snapshots: &[ClusterSnapshot]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Snapshot", "Cluster", "Type", "Status", "Engine", "Created",
        ]);

    for snapshot in snapshots {
        table.add_row(vec![
            snapshot.snapshot_id.clone(),
            snapshot.cluster_id.clone(),
            snapshot.snapshot_type.clone().unwrap_or_default(),
            snapshot.status.clone().unwrap_or_default(),
            snapshot.engine.clone().unwrap_or_default(),
            snapshot
                .snapshot_create_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        ]);
    }

    table
}
