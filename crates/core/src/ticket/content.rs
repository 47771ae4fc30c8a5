//! Rendering of ticket title, body and labels from an outcome.
//!
//! Everything here is pure: equal inputs give byte-identical output.

use serde::{Deserialize, Serialize};

use crate::event::{EvaluationOutcome, Outcome, RemediationOutcome};

/// Rendered ticket, ready to be sent to the ticketing system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketContent {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Key under which the stage label is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StageLabelKey {
    /// `keptn_stage:<stage>`
    #[default]
    Stage,
    /// `keptn_service:<stage>`, as emitted by earlier releases.
    Legacy,
}

impl StageLabelKey {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            Self::Legacy
        } else {
            Self::Stage
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Self::Stage => "keptn_stage",
            Self::Legacy => "keptn_service",
        }
    }
}

/// Link to the sequence in Keptn's Bridge.
pub fn bridge_link(bridge_base_url: &str, project: &str, correlation_context: &str) -> String {
    format!(
        "{}/project/{}/sequence/{}",
        bridge_base_url.trim_end_matches('/'),
        project,
        correlation_context
    )
}

/// Build the ticket for either kind of outcome.
pub fn build_ticket(
    outcome: &Outcome,
    correlation_context: &str,
    bridge_base_url: &str,
    stage_key: StageLabelKey,
) -> TicketContent {
    match outcome {
        Outcome::Evaluation(e) => {
            build_evaluation_ticket(e, correlation_context, bridge_base_url, stage_key)
        }
        Outcome::Remediation(r) => {
            build_remediation_ticket(r, correlation_context, bridge_base_url, stage_key)
        }
    }
}

pub fn build_evaluation_ticket(
    outcome: &EvaluationOutcome,
    correlation_context: &str,
    bridge_base_url: &str,
    stage_key: StageLabelKey,
) -> TicketContent {
    let title = format!(
        "[EVALUATION] {} - {} - {} - Result: {}",
        outcome.project, outcome.service, outcome.stage, outcome.result
    );

    let mut body = String::from("||*Result*||*Score*||\n");
    body.push_str(&format!(
        "|{}|{}|\n\n",
        outcome.result.decorated(),
        outcome.score
    ));
    body.push_str(&format!("Start Time: {}\n", outcome.time_start));
    body.push_str(&format!("End Time: {}\n", outcome.time_end));
    push_footer(&mut body, bridge_base_url, &outcome.project, correlation_context);

    let labels = build_labels(
        &outcome.project,
        &outcome.service,
        &outcome.stage,
        outcome.result.as_str(),
        &outcome.labels,
        stage_key,
    );

    TicketContent {
        title,
        body,
        labels,
    }
}

pub fn build_remediation_ticket(
    outcome: &RemediationOutcome,
    correlation_context: &str,
    bridge_base_url: &str,
    stage_key: StageLabelKey,
) -> TicketContent {
    let title = format!(
        "[REMEDIATION] {} - {} - {} - Result: {}",
        outcome.project, outcome.service, outcome.stage, outcome.result
    );

    let mut body = String::from("||*Remediation Status*||*Project*||*Service*||*Stage*||\n");
    body.push_str(&format!(
        "|{}|{}|{}|{}|\n\n",
        outcome.result.decorated(),
        outcome.project,
        outcome.service,
        outcome.stage
    ));
    body.push_str(&format!("Message: {}\n\n", outcome.message));
    push_footer(&mut body, bridge_base_url, &outcome.project, correlation_context);

    let labels = build_labels(
        &outcome.project,
        &outcome.service,
        &outcome.stage,
        outcome.result.as_str(),
        &outcome.labels,
        stage_key,
    );

    TicketContent {
        title,
        body,
        labels,
    }
}

fn push_footer(body: &mut String, bridge_base_url: &str, project: &str, correlation_context: &str) {
    body.push_str(&format!("Keptn Context ID: {}\n", correlation_context));
    body.push_str(&format!(
        "[Link To Keptn's Bridge|{}]",
        bridge_link(bridge_base_url, project, correlation_context)
    ));
}

/// Zendesk rejects whitespace in tags.
fn sanitize_label(value: &str) -> String {
    value.replace(' ', "-")
}

fn build_labels<'a>(
    project: &str,
    service: &str,
    stage: &str,
    result: &str,
    custom: impl IntoIterator<Item = (&'a String, &'a String)>,
    stage_key: StageLabelKey,
) -> Vec<String> {
    let mut labels = vec![
        format!("keptn_project:{}", sanitize_label(project)),
        format!("keptn_service:{}", sanitize_label(service)),
        format!("{}:{}", stage_key.key(), sanitize_label(stage)),
        format!("keptn_result:{}", sanitize_label(result)),
    ];

    labels.extend(
        custom
            .into_iter()
            .map(|(key, value)| format!("{}:{}", sanitize_label(key), sanitize_label(value))),
    );

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ResultKind;
    use std::collections::BTreeMap;

    fn evaluation(result: &str, score: f64) -> EvaluationOutcome {
        EvaluationOutcome {
            project: "sockshop".to_string(),
            service: "carts".to_string(),
            stage: "production".to_string(),
            result: ResultKind::parse(result),
            score,
            time_start: "2021-03-01T10:00:00Z".to_string(),
            time_end: "2021-03-01T10:05:00Z".to_string(),
            message: String::new(),
            labels: BTreeMap::new(),
        }
    }

    fn remediation(result: &str, message: &str) -> RemediationOutcome {
        RemediationOutcome {
            project: "sockshop".to_string(),
            service: "carts".to_string(),
            stage: "production".to_string(),
            result: ResultKind::parse(result),
            message: message.to_string(),
            labels: BTreeMap::new(),
        }
    }

    #[test]
    fn test_evaluation_ticket_layout() {
        let ticket = build_evaluation_ticket(
            &evaluation("pass", 100.0),
            "ctx-123",
            "https://bridge.acme.io",
            StageLabelKey::Stage,
        );

        assert_eq!(
            ticket.title,
            "[EVALUATION] sockshop - carts - production - Result: pass"
        );
        assert_eq!(
            ticket.body,
            "||*Result*||*Score*||\n\
             |pass ✅|100|\n\n\
             Start Time: 2021-03-01T10:00:00Z\n\
             End Time: 2021-03-01T10:05:00Z\n\
             Keptn Context ID: ctx-123\n\
             [Link To Keptn's Bridge|https://bridge.acme.io/project/sockshop/sequence/ctx-123]"
        );
    }

    #[test]
    fn test_evaluation_fractional_score() {
        let ticket = build_evaluation_ticket(
            &evaluation("warning", 87.5),
            "ctx",
            "https://bridge",
            StageLabelKey::Stage,
        );
        assert!(ticket.body.contains("|warning ⚠|87.5|"));
    }

    #[test]
    fn test_remediation_ticket_layout() {
        let ticket = build_remediation_ticket(
            &remediation("fail", "rollback failed"),
            "ctx-9",
            "https://bridge.acme.io/",
            StageLabelKey::Stage,
        );

        assert_eq!(
            ticket.title,
            "[REMEDIATION] sockshop - carts - production - Result: fail"
        );
        assert_eq!(
            ticket.body,
            "||*Remediation Status*||*Project*||*Service*||*Stage*||\n\
             |fail ❌|sockshop|carts|production|\n\n\
             Message: rollback failed\n\n\
             Keptn Context ID: ctx-9\n\
             [Link To Keptn's Bridge|https://bridge.acme.io/project/sockshop/sequence/ctx-9]"
        );
    }

    #[test]
    fn test_unknown_result_has_no_glyph() {
        let ticket = build_remediation_ticket(
            &remediation("errored", ""),
            "ctx",
            "b",
            StageLabelKey::Stage,
        );
        assert!(ticket.body.contains("|errored|sockshop|"));
    }

    #[test]
    fn test_labels_are_complete_and_ordered() {
        let mut outcome = evaluation("pass", 100.0);
        outcome
            .labels
            .insert("owner team".to_string(), "team a".to_string());
        outcome
            .labels
            .insert("build".to_string(), "1.2.3".to_string());

        let ticket = build_evaluation_ticket(&outcome, "ctx", "b", StageLabelKey::Stage);
        assert_eq!(
            ticket.labels,
            vec![
                "keptn_project:sockshop",
                "keptn_service:carts",
                "keptn_stage:production",
                "keptn_result:pass",
                "build:1.2.3",
                "owner-team:team-a",
            ]
        );
    }

    #[test]
    fn test_labels_replace_every_space() {
        let mut outcome = remediation("fail", "");
        outcome.project = "my sock shop".to_string();
        outcome.stage = "pre prod".to_string();
        outcome
            .labels
            .insert(" a  b ".to_string(), "c d  e".to_string());

        let ticket = build_remediation_ticket(&outcome, "ctx", "b", StageLabelKey::Stage);
        assert!(ticket.labels.contains(&"keptn_project:my-sock-shop".to_string()));
        assert!(ticket.labels.contains(&"keptn_stage:pre-prod".to_string()));
        assert!(ticket.labels.contains(&"-a--b-:c-d--e".to_string()));
        assert!(ticket.labels.iter().all(|l| !l.contains(' ')));
    }

    #[test]
    fn test_legacy_stage_label_key() {
        let ticket = build_evaluation_ticket(
            &evaluation("pass", 1.0),
            "ctx",
            "b",
            StageLabelKey::from_legacy_flag(true),
        );
        let service_labels: Vec<_> = ticket
            .labels
            .iter()
            .filter(|l| l.starts_with("keptn_service:"))
            .collect();
        assert_eq!(
            service_labels,
            vec!["keptn_service:carts", "keptn_service:production"]
        );
        assert!(!ticket.labels.iter().any(|l| l.starts_with("keptn_stage:")));
    }

    #[test]
    fn test_label_key_counts() {
        for outcome in [
            Outcome::Evaluation(evaluation("pass", 100.0)),
            Outcome::Remediation(remediation("warning", "")),
        ] {
            let ticket = build_ticket(&outcome, "ctx", "b", StageLabelKey::Stage);
            let count = |prefix: &str| {
                ticket
                    .labels
                    .iter()
                    .filter(|l| l.starts_with(prefix))
                    .count()
            };
            assert_eq!(count("keptn_project:"), 1);
            assert_eq!(count("keptn_service:"), 1);
            assert_eq!(count("keptn_stage:"), 1);
            assert_eq!(count("keptn_result:"), 1);
        }
    }

    #[test]
    fn test_building_is_deterministic() {
        let mut outcome = evaluation("fail", 12.0);
        for i in 0..20 {
            outcome
                .labels
                .insert(format!("key {}", i), format!("value {}", i));
        }
        let outcome = Outcome::Evaluation(outcome);

        let first = build_ticket(&outcome, "ctx", "https://b", StageLabelKey::Stage);
        let second = build_ticket(&outcome.clone(), "ctx", "https://b", StageLabelKey::Stage);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_fields_render_in_place() {
        let ticket = build_remediation_ticket(
            &RemediationOutcome::default(),
            "",
            "",
            StageLabelKey::Stage,
        );
        assert_eq!(ticket.title, "[REMEDIATION]  -  -  - Result: ");
        assert!(ticket.body.contains("[Link To Keptn's Bridge|/project//sequence/]"));
        assert_eq!(ticket.labels[0], "keptn_project:");
    }

    #[test]
    fn test_bridge_link() {
        assert_eq!(
            bridge_link("https://keptn.acme.io", "sockshop", "abc"),
            "https://keptn.acme.io/project/sockshop/sequence/abc"
        );
    }
}
