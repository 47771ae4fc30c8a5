//! CloudEvent receiver.
//!
//! Accepts events in both HTTP content modes:
//! - structured: the whole CloudEvent is the JSON body
//! - binary: attributes travel as `ce-*` headers and the body is `data`

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;
use zendesk_bridge_core::{EventError, HandledEvent, InboundEvent};

use crate::state::AppState;

const BINARY_ATTRIBUTE_PREFIX: &str = "ce-";

#[derive(Debug, Serialize)]
pub struct EventErrorResponse {
    pub error: String,
}

/// Receive one CloudEvent and run it through the bridge.
pub async fn receive_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<HandledEvent>, (StatusCode, Json<EventErrorResponse>)> {
    let event = decode_event(&headers, &body).map_err(bad_request)?;
    let handled = state.bridge().handle(&event).await.map_err(bad_request)?;
    Ok(Json(handled))
}

fn bad_request(e: EventError) -> (StatusCode, Json<EventErrorResponse>) {
    warn!(error = %e, "Rejected CloudEvent");
    (
        StatusCode::BAD_REQUEST,
        Json(EventErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Decode an event from either content mode.
///
/// A `ce-type` header selects binary mode; anything else is parsed as a
/// structured CloudEvent.
pub fn decode_event(headers: &HeaderMap, body: &[u8]) -> Result<InboundEvent, EventError> {
    if headers.contains_key("ce-type") {
        decode_binary(headers, body)
    } else {
        serde_json::from_slice(body).map_err(|e| EventError::InvalidEnvelope(e.to_string()))
    }
}

fn decode_binary(headers: &HeaderMap, body: &[u8]) -> Result<InboundEvent, EventError> {
    let mut envelope = Map::new();
    for (name, value) in headers {
        let Some(attribute) = name.as_str().strip_prefix(BINARY_ATTRIBUTE_PREFIX) else {
            continue;
        };
        let value = value.to_str().map_err(|_| {
            EventError::InvalidEnvelope(format!("header {} is not valid text", name))
        })?;
        envelope.insert(attribute.to_string(), Value::String(value.to_string()));
    }

    let data = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body)
            .map_err(|e| EventError::InvalidEnvelope(format!("data is not JSON: {}", e)))?
    };
    envelope.insert("data".to_string(), data);

    serde_json::from_value(Value::Object(envelope))
        .map_err(|e| EventError::InvalidEnvelope(e.to_string()))
}
