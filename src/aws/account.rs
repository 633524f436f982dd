//! AWS account validation and identity

use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
///
/// Prevents account IDs from mixing with other strings and pins credential
/// validation to one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Get the account ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Fetch the current AWS account ID from credentials via STS GetCallerIdentity
///
/// Requires no special permissions and always succeeds with valid
/// credentials, so it doubles as a fail-fast credential check before the
/// first RDS call is attempted.
pub async fn get_current_account_id(config: &aws_config::SdkConfig) -> Result<AccountId> {
    let sts = aws_sdk_sts::Client::new(config);
    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(AccountId(account.to_string()))
}
