//! RDS error classification and handling
//!
//! Provides typed errors for RDS SDK operations using the `.code()` method
//! instead of string matching on Debug format. The reconcilers branch on
//! these kinds, never on raw fault strings.

use aws_sdk_rds::error::{ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// RDS error categories for reconciliation and wait logic
#[derive(Debug, Error)]
pub enum RdsError {
    /// Resource was not found — the only signal that triggers the
    /// create/restore branch, and success for absent-state reconciliation
    #[error("{resource_type} '{resource_id}' not found")]
    NotFound {
        resource_type: &'static str,
        resource_id: String,
    },

    /// Resource already exists or is in a state that rejects the operation
    #[error("conflicting resource state ({code}): {message}")]
    Conflict { code: String, message: String },

    /// Rate limit exceeded
    #[error("RDS API rate limit exceeded")]
    Throttled,

    /// Any other RDS API failure, carrying the arguments that were submitted
    #[error("{op} failed ({}): {message}", code.as_deref().unwrap_or("no error code"))]
    Api {
        op: &'static str,
        code: Option<String>,
        message: String,
        api_args: Option<serde_json::Value>,
    },
}

impl RdsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, RdsError::NotFound { .. })
    }

    /// Check if this is a conflict / already-exists error
    pub fn is_conflict(&self) -> bool {
        matches!(self, RdsError::Conflict { .. })
    }

    /// Check if a poll hitting this error should be treated as "not yet
    /// ready" rather than aborting the wait. NotFound covers the visibility
    /// lag right after a create; Throttled resolves on its own. Everything
    /// else (permission denial, malformed request) will never self-heal.
    pub fn is_wait_retryable(&self) -> bool {
        matches!(self, RdsError::NotFound { .. } | RdsError::Throttled)
    }

    /// The API arguments that were being submitted, when captured
    pub fn api_args(&self) -> Option<&serde_json::Value> {
        match self {
            RdsError::Api { api_args, .. } => api_args.as_ref(),
            _ => None,
        }
    }
}

/// Known RDS fault codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "DBClusterNotFoundFault",
    "DBInstanceNotFound",
    "DBInstanceNotFoundFault",
    "DBClusterSnapshotNotFoundFault",
];

/// Known RDS fault codes for conflicting state
const CONFLICT_CODES: &[&str] = &[
    "DBClusterAlreadyExistsFault",
    "DBInstanceAlreadyExists",
    "DBClusterSnapshotAlreadyExistsFault",
    "InvalidDBClusterStateFault",
    "InvalidDBInstanceState",
    "InvalidDBInstanceStateFault",
];

/// Known RDS fault codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Human label for the resource type a not-found code refers to
fn not_found_resource_type(code: &str) -> &'static str {
    match code {
        "DBClusterNotFoundFault" => "DB cluster",
        "DBInstanceNotFound" | "DBInstanceNotFoundFault" => "DB instance",
        "DBClusterSnapshotNotFoundFault" => "DB cluster snapshot",
        _ => "resource",
    }
}

/// Classify an RDS API error using the fault code.
///
/// `resource_id` is the identifier the operation targeted; `api_args` the
/// serialized request, attached so a failed invocation can echo exactly what
/// was submitted.
pub fn classify_rds_error(
    op: &'static str,
    resource_id: &str,
    code: Option<&str>,
    message: Option<&str>,
    api_args: Option<serde_json::Value>,
) -> RdsError {
    let message = message.unwrap_or("unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => RdsError::NotFound {
            resource_type: not_found_resource_type(c),
            resource_id: resource_id.to_string(),
        },
        Some(c) if CONFLICT_CODES.contains(&c) => RdsError::Conflict {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => RdsError::Throttled,
        _ => RdsError::Api {
            op,
            code: code.map(|s| s.to_string()),
            message,
            api_args,
        },
    }
}

/// Classify a concrete `SdkError` from any RDS operation.
///
/// Reads `.code()`/`.message()` through `ProvideErrorMetadata`; non-service
/// failures (connect timeouts, dispatch errors) have no code and fall back
/// to the flattened error chain as the message.
pub(crate) fn classify_sdk_error<E>(
    op: &'static str,
    resource_id: &str,
    err: SdkError<E>,
    api_args: Option<serde_json::Value>,
) -> RdsError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    let message = match err.message() {
        Some(m) => m.to_string(),
        None => format!("{:#}", anyhow::Error::from(err)),
    };
    classify_rds_error(op, resource_id, code.as_deref(), Some(&message), api_args)
}
