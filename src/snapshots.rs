//! Cluster snapshot search
//!
//! A pure read path: a remote describe with the server-side filter, then
//! local post-processing — anchored identifier regex, status and type
//! filters, optional sorting, and slice bounds that only apply when a sort
//! was requested.

use crate::aws::error::RdsError;
use crate::aws::rds::{ClusterSnapshot, SnapshotFilter, SnapshotOperations};
use crate::config::ValidationError;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Snapshot type filter, matching the values the RDS API reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SnapshotType {
    Automated,
    Manual,
    Shared,
    Public,
}

/// Sort key for the result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SortKey {
    Id,
    SnapshotCreateTime,
    ClusterCreateTime,
}

/// Sort direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A snapshot search: remote filter plus local post-processing options
#[derive(Debug, Clone, Default)]
pub struct SnapshotQuery {
    /// Exact snapshot identifier (mutually exclusive with `cluster_id`)
    pub snapshot_id: Option<String>,
    /// Limit to snapshots of one cluster (mutually exclusive with `snapshot_id`)
    pub cluster_id: Option<String>,
    pub snapshot_type: Option<SnapshotType>,
    /// Status filter, applied locally (e.g. `available`, `creating`)
    pub status: Option<String>,
    /// Anchored regular expression matched against the snapshot identifier
    pub id_regex: Option<String>,
    /// Server-side page size cap
    pub max_records: Option<i32>,
    pub sort: Option<SortKey>,
    pub sort_order: SortOrder,
    /// Slice start, applied only when `sort` is set
    pub start: Option<usize>,
    /// Slice end (exclusive), applied only when `sort` is set
    pub end: Option<usize>,
}

/// Snapshot search failure
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rds(#[from] RdsError),
}

impl SnapshotQuery {
    /// Reject malformed queries before any remote call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.compile().map(|_| ())
    }

    /// Check filter consistency and build the anchored identifier matcher.
    fn compile(&self) -> Result<Option<Regex>, ValidationError> {
        if self.snapshot_id.is_some() && self.cluster_id.is_some() {
            return Err(ValidationError::ConflictingSnapshotFilters);
        }
        self.id_regex
            .as_ref()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})"))
                    .map_err(|e| ValidationError::InvalidIdRegex(e.to_string()))
            })
            .transpose()
    }

    /// The server-side half of the query.
    fn remote_filter(&self) -> SnapshotFilter {
        SnapshotFilter {
            snapshot_id: self.snapshot_id.clone(),
            cluster_id: self.cluster_id.clone(),
            snapshot_type: self.snapshot_type.map(|t| t.to_string()),
            max_records: self.max_records,
        }
    }
}

/// Run a snapshot search against the gateway.
pub async fn search<G: SnapshotOperations>(
    gateway: &G,
    query: &SnapshotQuery,
) -> Result<Vec<ClusterSnapshot>, SearchError> {
    let matcher = query.compile()?;
    let snapshots = gateway
        .describe_cluster_snapshots(query.remote_filter())
        .await?;
    debug!(fetched = snapshots.len(), "Snapshots fetched");
    Ok(post_process(snapshots, query, matcher))
}

/// Apply the local half of the query: filters, sort, slice.
fn post_process(
    mut snapshots: Vec<ClusterSnapshot>,
    query: &SnapshotQuery,
    matcher: Option<Regex>,
) -> Vec<ClusterSnapshot> {
    if let Some(regex) = &matcher {
        snapshots.retain(|s| regex.is_match(&s.snapshot_id));
    }
    if let Some(snapshot_type) = query.snapshot_type {
        let wanted = snapshot_type.to_string();
        snapshots.retain(|s| s.snapshot_type.as_deref() == Some(wanted.as_str()));
    }
    if let Some(status) = &query.status {
        snapshots.retain(|s| s.status.as_deref() == Some(status.as_str()));
    }

    let Some(sort) = query.sort else {
        return snapshots;
    };

    match sort {
        SortKey::Id => snapshots.sort_by(|a, b| a.snapshot_id.cmp(&b.snapshot_id)),
        SortKey::SnapshotCreateTime => {
            snapshots.sort_by(|a, b| a.snapshot_create_time.cmp(&b.snapshot_create_time))
        }
        SortKey::ClusterCreateTime => {
            snapshots.sort_by(|a, b| a.cluster_create_time.cmp(&b.cluster_create_time))
        }
    }
    if query.sort_order == SortOrder::Descending {
        snapshots.reverse();
    }

    // Slice bounds only apply to sorted results
    let len = snapshots.len();
    let start = query.start.unwrap_or(0).min(len);
    let end = query.end.unwrap_or(len).min(len);
    if start >= end {
        return Vec::new();
    }
    snapshots.drain(..start);
    snapshots.truncate(end - start);
    snapshots
}
