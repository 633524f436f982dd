//! Convergence waiting with fixed-interval polling and cancellation support.
//!
//! After a create, restore, or modify, the resource transitions cloud-side
//! through statuses like `creating` or `modifying` until it reaches
//! `available`. The waiter polls at a fixed interval until that terminal
//! status or a wall-clock deadline. NotFound and Throttled during a poll are
//! treated as "not yet ready"; any other error aborts the wait, so a
//! permission denial fails fast instead of hanging until the deadline.

use crate::aws::error::RdsError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Interval between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Terminal status that ends the wait (compared case-insensitively)
const AVAILABLE_STATUS: &str = "available";

/// Configuration for convergence waiting
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Fixed delay between polls
    pub poll_interval: Duration,
    /// Maximum total time to wait before timing out
    pub deadline: Duration,
}

impl WaitConfig {
    /// Create a config with the default poll interval and the given deadline.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline,
        }
    }
}

/// A resource that reports a cloud-defined status string
pub trait ResourceStatus {
    fn status(&self) -> &str;
}

impl ResourceStatus for crate::aws::rds::DbCluster {
    fn status(&self) -> &str {
        &self.status
    }
}

impl ResourceStatus for crate::aws::rds::DbInstance {
    fn status(&self) -> &str {
        &self.status
    }
}

/// Failure modes of a convergence wait
#[derive(Debug, Error)]
pub enum WaitError<R> {
    /// The deadline elapsed before the resource became available.
    /// `last_seen` is the most recent successfully fetched snapshot, absent
    /// when every poll failed.
    #[error(
        "timed out waiting for '{resource_id}' to become available after {polls} polls ({elapsed:?})"
    )]
    Timeout {
        resource_id: String,
        polls: u32,
        elapsed: Duration,
        last_seen: Option<R>,
    },

    /// The caller cancelled the wait
    #[error("wait for '{0}' cancelled")]
    Cancelled(String),

    /// A poll failed with an error that will not resolve on its own
    #[error("wait for '{resource_id}' failed")]
    Failed {
        resource_id: String,
        #[source]
        source: RdsError,
    },
}

impl<R> WaitError<R> {
    /// The last successfully fetched resource snapshot on timeout.
    pub fn last_seen(&self) -> Option<&R> {
        match self {
            WaitError::Timeout { last_seen, .. } => last_seen.as_ref(),
            _ => None,
        }
    }
}

/// Poll `fetch` at a fixed interval until the resource reports `available`
/// (case-insensitive) or the deadline elapses.
///
/// # Arguments
/// * `config` - Poll interval and deadline
/// * `cancel` - Optional cancellation token, checked before each poll and
///   raced against the inter-poll sleep
/// * `fetch` - Async function returning the current resource view
/// * `resource_id` - Identifier for logging and error messages
pub async fn wait_until_available<R, F, Fut>(
    config: WaitConfig,
    cancel: Option<&CancellationToken>,
    fetch: F,
    resource_id: &str,
) -> Result<R, WaitError<R>>
where
    R: ResourceStatus,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<R, RdsError>>,
{
    let start = tokio::time::Instant::now();
    let mut polls = 0u32;
    let mut last_seen: Option<R> = None;

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(WaitError::Cancelled(resource_id.to_string()));
            }
        }

        if start.elapsed() >= config.deadline {
            return Err(WaitError::Timeout {
                resource_id: resource_id.to_string(),
                polls,
                elapsed: start.elapsed(),
                last_seen,
            });
        }

        polls += 1;
        match fetch().await {
            Ok(resource) if resource.status().eq_ignore_ascii_case(AVAILABLE_STATUS) => {
                debug!(resource_id = %resource_id, polls, "Resource available");
                return Ok(resource);
            }
            Ok(resource) => {
                debug!(
                    resource_id = %resource_id,
                    status = %resource.status(),
                    poll = polls,
                    "Resource not yet available"
                );
                last_seen = Some(resource);
            }
            Err(e) if e.is_wait_retryable() => {
                debug!(
                    resource_id = %resource_id,
                    error = %e,
                    poll = polls,
                    "Transient error while polling, treating as not ready"
                );
            }
            Err(e) => {
                warn!(resource_id = %resource_id, error = %e, "Wait aborted");
                return Err(WaitError::Failed {
                    resource_id: resource_id.to_string(),
                    source: e,
                });
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = async {
                if let Some(token) = cancel {
                    token.cancelled().await
                } else {
                    std::future::pending::<()>().await
                }
            } => {
                return Err(WaitError::Cancelled(resource_id.to_string()));
            }
        }
    }
}
