//! Keptn event envelope and the typed outcomes decoded from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// CloudEvent type of a finished quality-gate evaluation.
pub const EVALUATION_FINISHED: &str = "sh.keptn.event.evaluation.finished";

/// CloudEvent type of a finished remediation sequence.
pub const REMEDIATION_FINISHED: &str = "sh.keptn.event.remediation.finished";

/// An inbound CloudEvent as delivered by Keptn's distributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(default = "default_specversion")]
    pub specversion: String,
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Keptn context linking the event to its sequence.
    #[serde(default)]
    pub shkeptncontext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggeredid: Option<String>,
    #[serde(default)]
    pub data: Value,
}

fn default_specversion() -> String {
    "1.0".to_string()
}

impl InboundEvent {
    /// Create an event with the given type, context and data.
    pub fn new(event_type: impl Into<String>, keptn_context: impl Into<String>, data: Value) -> Self {
        Self {
            specversion: default_specversion(),
            id: uuid::Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            source: String::new(),
            time: Some(Utc::now()),
            shkeptncontext: keptn_context.into(),
            triggeredid: None,
            data,
        }
    }

    /// The correlation context used for Bridge back-links.
    pub fn correlation_context(&self) -> &str {
        &self.shkeptncontext
    }
}

/// Event kinds this service reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    EvaluationFinished,
    RemediationFinished,
}

impl EventKind {
    /// Match a CloudEvent type string.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            EVALUATION_FINISHED => Some(Self::EvaluationFinished),
            REMEDIATION_FINISHED => Some(Self::RemediationFinished),
            _ => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::EvaluationFinished => EVALUATION_FINISHED,
            Self::RemediationFinished => REMEDIATION_FINISHED,
        }
    }

    /// Short name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EvaluationFinished => "evaluation",
            Self::RemediationFinished => "remediation",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result reported by Keptn for an evaluation or remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultKind {
    Pass,
    Warning,
    Fail,
    /// Anything else, kept verbatim.
    Other(String),
}

impl ResultKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pass" => Self::Pass,
            "warning" => Self::Warning,
            "fail" => Self::Fail,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => "pass",
            Self::Warning => "warning",
            Self::Fail => "fail",
            Self::Other(raw) => raw,
        }
    }

    /// Glyph appended to the result in ticket bodies.
    pub fn decoration(&self) -> Option<&'static str> {
        match self {
            Self::Pass => Some("✅"),
            Self::Warning => Some("⚠"),
            Self::Fail => Some("❌"),
            Self::Other(_) => None,
        }
    }

    /// The result followed by its glyph, e.g. `pass ✅`.
    pub fn decorated(&self) -> String {
        match self.decoration() {
            Some(glyph) => format!("{} {}", self.as_str(), glyph),
            None => self.as_str().to_string(),
        }
    }
}

impl Default for ResultKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ResultKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ResultKind> for String {
    fn from(result: ResultKind) -> Self {
        result.as_str().to_string()
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a quality-gate evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub project: String,
    pub service: String,
    pub stage: String,
    pub result: ResultKind,
    pub score: f64,
    pub time_start: String,
    pub time_end: String,
    pub message: String,
    pub labels: BTreeMap<String, String>,
}

/// Outcome of an automated remediation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemediationOutcome {
    pub project: String,
    pub service: String,
    pub stage: String,
    pub result: ResultKind,
    pub message: String,
    pub labels: BTreeMap<String, String>,
}

/// Typed data of a routable event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Evaluation(EvaluationOutcome),
    Remediation(RemediationOutcome),
}

impl Outcome {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Evaluation(_) => EventKind::EvaluationFinished,
            Self::Remediation(_) => EventKind::RemediationFinished,
        }
    }

    pub fn project(&self) -> &str {
        match self {
            Self::Evaluation(e) => &e.project,
            Self::Remediation(r) => &r.project,
        }
    }

    pub fn service(&self) -> &str {
        match self {
            Self::Evaluation(e) => &e.service,
            Self::Remediation(r) => &r.service,
        }
    }

    pub fn stage(&self) -> &str {
        match self {
            Self::Evaluation(e) => &e.stage,
            Self::Remediation(r) => &r.stage,
        }
    }

    pub fn result(&self) -> &ResultKind {
        match self {
            Self::Evaluation(e) => &e.result,
            Self::Remediation(r) => &r.result,
        }
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Evaluation(e) => &e.labels,
            Self::Remediation(r) => &r.labels,
        }
    }
}

// ============================================================================
// Keptn wire payloads
// ============================================================================

/// Decode a present `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

type WireLabels = BTreeMap<String, Option<String>>;

fn flatten_labels(labels: WireLabels) -> BTreeMap<String, String> {
    labels
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect()
}

/// `data` of `sh.keptn.event.evaluation.finished`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct EvaluationFinishedData {
    #[serde(deserialize_with = "null_as_default")]
    project: String,
    #[serde(deserialize_with = "null_as_default")]
    stage: String,
    #[serde(deserialize_with = "null_as_default")]
    service: String,
    #[serde(deserialize_with = "null_as_default")]
    labels: WireLabels,
    #[serde(deserialize_with = "null_as_default")]
    message: String,
    #[serde(deserialize_with = "null_as_default")]
    evaluation: EvaluationDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EvaluationDetails {
    #[serde(deserialize_with = "null_as_default")]
    time_start: String,
    #[serde(deserialize_with = "null_as_default")]
    time_end: String,
    #[serde(deserialize_with = "null_as_default")]
    result: String,
    #[serde(deserialize_with = "null_as_default")]
    score: f64,
}

impl From<EvaluationFinishedData> for EvaluationOutcome {
    fn from(data: EvaluationFinishedData) -> Self {
        Self {
            project: data.project,
            service: data.service,
            stage: data.stage,
            result: ResultKind::parse(&data.evaluation.result),
            score: data.evaluation.score,
            time_start: data.evaluation.time_start,
            time_end: data.evaluation.time_end,
            message: data.message,
            labels: flatten_labels(data.labels),
        }
    }
}

/// `data` of `sh.keptn.event.remediation.finished`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RemediationFinishedData {
    #[serde(deserialize_with = "null_as_default")]
    project: String,
    #[serde(deserialize_with = "null_as_default")]
    stage: String,
    #[serde(deserialize_with = "null_as_default")]
    service: String,
    #[serde(deserialize_with = "null_as_default")]
    labels: WireLabels,
    #[serde(deserialize_with = "null_as_default")]
    result: String,
    #[serde(deserialize_with = "null_as_default")]
    message: String,
}

impl From<RemediationFinishedData> for RemediationOutcome {
    fn from(data: RemediationFinishedData) -> Self {
        Self {
            project: data.project,
            service: data.service,
            stage: data.stage,
            result: ResultKind::parse(&data.result),
            message: data.message,
            labels: flatten_labels(data.labels),
        }
    }
}
