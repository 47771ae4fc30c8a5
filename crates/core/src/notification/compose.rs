use std::collections::BTreeMap;

use super::types::{AttachRules, SecondaryNotification, Tag, TargetingRule, SERVICE_NAME};
use crate::event::Outcome;
use crate::ticket::bridge_link;

/// Ticket id embedded in a ticket URL: everything after the last `/`.
pub fn ticket_id_from_url(ticket_url: &str) -> &str {
    ticket_url
        .rsplit_once('/')
        .map(|(_, id)| id)
        .unwrap_or(ticket_url)
}

/// Tag rule attaching the notification to the outcome's service.
pub fn targeting_rule(outcome: &Outcome) -> TargetingRule {
    TargetingRule {
        me_types: vec!["SERVICE".to_string()],
        tags: vec![
            Tag::contextless("keptn_project", outcome.project()),
            Tag::contextless("keptn_stage", outcome.stage()),
            Tag::contextless("keptn_service", outcome.service()),
        ],
    }
}

/// Build the notification for a created (or failed) ticket.
///
/// Pure; composing does not imply the notification will be sent.
pub fn compose_notification(
    event_type: &str,
    ticket_url: &str,
    outcome: &Outcome,
    correlation_context: &str,
    bridge_base_url: &str,
) -> SecondaryNotification {
    let mut properties = BTreeMap::new();
    let description = match outcome {
        Outcome::Evaluation(e) => {
            properties.insert("Quality Gate Result".to_string(), e.result.to_string());
            properties.insert("Quality Gate Score".to_string(), e.score.to_string());
            "Keptn Quality Gate Evaluation"
        }
        Outcome::Remediation(r) => {
            properties.insert("Result".to_string(), r.result.to_string());
            "Keptn Remediation Attempt"
        }
    };

    properties.insert("Keptn Project".to_string(), outcome.project().to_string());
    properties.insert("Keptn Service".to_string(), outcome.service().to_string());
    properties.insert("Keptn Stage".to_string(), outcome.stage().to_string());
    properties.insert("Ticket".to_string(), ticket_url.to_string());
    properties.insert("SentBy".to_string(), "Keptn".to_string());
    properties.insert(
        "BridgeURL".to_string(),
        bridge_link(bridge_base_url, outcome.project(), correlation_context),
    );

    SecondaryNotification {
        event_type: event_type.to_string(),
        source: SERVICE_NAME.to_string(),
        title: format!("Ticket Created: #{}", ticket_id_from_url(ticket_url)),
        attach_rules: AttachRules {
            tag_rule: vec![targeting_rule(outcome)],
        },
        description: description.to_string(),
        custom_properties: properties,
    }
}
