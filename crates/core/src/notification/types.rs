//! Dynatrace info event payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source reported on every notification.
pub const SERVICE_NAME: &str = "zendesk-service";

/// Tag context used for Keptn's standard tags.
pub const CONTEXTLESS: &str = "CONTEXTLESS";

/// A secondary notification referencing a created ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryNotification {
    pub event_type: String,
    pub source: String,
    pub title: String,
    pub attach_rules: AttachRules,
    pub description: String,
    pub custom_properties: BTreeMap<String, String>,
}

/// Which monitored entities the notification attaches to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRules {
    pub tag_rule: Vec<TargetingRule>,
}

/// Entity types plus the tags an entity must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingRule {
    pub me_types: Vec<String>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub context: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl Tag {
    /// A `CONTEXTLESS` tag.
    pub fn contextless(key: &str, value: &str) -> Self {
        Self {
            context: CONTEXTLESS.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
