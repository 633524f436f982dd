//! Desired-state reconciliation
//!
//! One reconciliation pass fetches the live resource, computes the minimal
//! mutation set against the desired configuration, and issues at most one
//! corrective call: create, restore, modify, or nothing. Absent-state
//! reconciliation deletes, treating "already absent" as success.

pub mod cluster;
pub mod instance;

use crate::aws::error::RdsError;
use crate::aws::rds::TagOperations;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The corrective action a reconciliation pass took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resource was created from scratch
    Created,
    /// Resource was restored from a snapshot
    Restored,
    /// A non-empty mutation set was applied
    Modified,
    /// Resource already matched the desired state
    Unchanged,
    /// Resource was deleted
    Deleted,
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct Reconciled<R> {
    pub resource: R,
    pub action: Action,
}

impl<R> Reconciled<R> {
    /// Whether this pass brought the resource into existence
    pub fn created(&self) -> bool {
        matches!(self.action, Action::Created | Action::Restored)
    }

    /// Whether this pass changed anything remotely
    pub fn changed(&self) -> bool {
        self.action != Action::Unchanged
    }
}

/// Replace the full tag set on a resource with the desired one.
///
/// Tags are reconciled unconditionally rather than diffed: every current
/// key is removed, then the desired set is reapplied. Simpler than a
/// minimal tag diff, at the cost of two extra calls per pass.
pub(crate) async fn sync_tags<G: TagOperations>(
    gateway: &G,
    arn: &str,
    desired: Option<&BTreeMap<String, String>>,
) -> Result<(), RdsError> {
    let current = gateway.list_tags(arn).await?;
    if !current.is_empty() {
        let keys: Vec<String> = current.keys().cloned().collect();
        gateway.remove_tags(arn, &keys).await?;
    }
    if let Some(tags) = desired {
        if !tags.is_empty() {
            gateway.add_tags(arn, tags).await?;
        }
    }
    debug!(arn = %arn, "Tags synchronized");
    Ok(())
}

/// Compare two string lists as unordered sets.
pub(crate) fn sets_differ(desired: &[String], current: &[String]) -> bool {
    use std::collections::BTreeSet;
    let desired: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
    let current: BTreeSet<&str> = current.iter().map(String::as_str).collect();
    desired != current
}
