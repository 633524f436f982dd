//! AWS service clients
//!
//! - `rds`: the gateway to clusters, instances, snapshots, and tags
//! - `context`/`account`: shared SDK config and credential validation
//! - `error`: typed RDS error classification

pub mod account;
pub mod context;
pub mod error;
pub mod rds;

pub use account::{get_current_account_id, AccountId};
pub use context::{AwsContext, FromAwsContext};
pub use error::{classify_rds_error, RdsError};
pub use rds::RdsClient;
