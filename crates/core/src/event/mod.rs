//! Inbound Keptn events and routing by event type.

mod types;

pub use types::*;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while decoding an inbound event.
#[derive(Debug, Error)]
pub enum EventError {
    /// The CloudEvent envelope itself is malformed.
    #[error("Invalid CloudEvent envelope: {0}")]
    InvalidEnvelope(String),

    /// The `data` of a routable event does not match its type.
    #[error("Invalid {event_type} payload: {reason}")]
    InvalidPayload { event_type: String, reason: String },
}

/// Route an event by its type and decode its data.
///
/// Returns `Ok(None)` for event types this service does not handle. Missing
/// fields in the data decode to empty values; only structurally wrong data
/// (e.g. a string where an object is expected) is an error.
pub fn classify(event: &InboundEvent) -> Result<Option<Outcome>, EventError> {
    let Some(kind) = EventKind::from_event_type(&event.event_type) else {
        debug!(event_type = %event.event_type, "Ignoring unhandled event type");
        return Ok(None);
    };

    let outcome = match kind {
        EventKind::EvaluationFinished => {
            Outcome::Evaluation(decode::<EvaluationFinishedData>(event)?.into())
        }
        EventKind::RemediationFinished => {
            Outcome::Remediation(decode::<RemediationFinishedData>(event)?.into())
        }
    };

    Ok(Some(outcome))
}

fn decode<T: DeserializeOwned>(event: &InboundEvent) -> Result<T, EventError> {
    let data = match &event.data {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };

    serde_json::from_value(data).map_err(|e| EventError::InvalidPayload {
        event_type: event.event_type.clone(),
        reason: e.to_string(),
    })
}
