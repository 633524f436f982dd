//! Resource tag call sites
//!
//! RDS tags are keyed by resource ARN through a separate API family, so tag
//! reconciliation happens outside the attribute mutation set.

use super::RdsClient;
use crate::aws::error::{classify_sdk_error, RdsError};
use aws_sdk_rds::types::Tag;
use std::collections::BTreeMap;
use tracing::debug;

/// Convert a tag map into SDK tag pairs, in key order.
pub(crate) fn to_sdk_tags(tags: &BTreeMap<String, String>) -> Vec<Tag> {
    tags.iter()
        .map(|(k, v)| Tag::builder().key(k).value(v).build())
        .collect()
}

impl RdsClient {
    /// List tags currently on a resource.
    pub(crate) async fn list_tags(&self, arn: &str) -> Result<BTreeMap<String, String>, RdsError> {
        debug!(arn = %arn, "Listing resource tags");

        let output = self
            .client
            .list_tags_for_resource()
            .resource_name(arn)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    "ListTagsForResource",
                    arn,
                    e,
                    Some(serde_json::json!({ "ResourceName": arn })),
                )
            })?;

        Ok(output
            .tag_list()
            .iter()
            .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
            .collect())
    }

    /// Add (or overwrite) tags on a resource.
    pub(crate) async fn add_tags(
        &self,
        arn: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<(), RdsError> {
        debug!(arn = %arn, count = tags.len(), "Adding resource tags");

        self.client
            .add_tags_to_resource()
            .resource_name(arn)
            .set_tags(Some(to_sdk_tags(tags)))
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    "AddTagsToResource",
                    arn,
                    e,
                    Some(serde_json::json!({ "ResourceName": arn, "Tags": tags })),
                )
            })?;

        Ok(())
    }

    /// Remove tags by key from a resource.
    pub(crate) async fn remove_tags(&self, arn: &str, keys: &[String]) -> Result<(), RdsError> {
        debug!(arn = %arn, count = keys.len(), "Removing resource tags");

        self.client
            .remove_tags_from_resource()
            .resource_name(arn)
            .set_tag_keys(Some(keys.to_vec()))
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    "RemoveTagsFromResource",
                    arn,
                    e,
                    Some(serde_json::json!({ "ResourceName": arn, "TagKeys": keys })),
                )
            })?;

        Ok(())
    }
}
