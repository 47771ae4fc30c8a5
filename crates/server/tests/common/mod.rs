//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock sinks injected, so events can be posted without Zendesk or
//! Dynatrace.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use zendesk_bridge_core::{
    testing::{MockNotificationSink, MockTicketSink},
    Config, EventBridge,
};
use zendesk_bridge_server::state::AppState;

/// Re-export fixtures for test convenience
pub use zendesk_bridge_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_evaluation() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/", json!({ "type": "...", "data": {} })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock ticket sink - inspect created tickets, inject failures
    pub tickets: Arc<MockTicketSink>,
    /// Mock notification sink - inspect sent notifications
    pub notifier: Arc<MockNotificationSink>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with everything enabled.
    pub fn new() -> Self {
        Self::with_config(fixtures::enabled_config())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let tickets = Arc::new(MockTicketSink::new());
        let notifier = Arc::new(MockNotificationSink::new());

        let config = Arc::new(config);
        let bridge = EventBridge::new(Arc::clone(&config), tickets.clone())
            .with_notifier(notifier.clone());
        let state = Arc::new(AppState::new(config, bridge));

        let router = zendesk_bridge_server::api::create_router(state);

        Self {
            router,
            tickets,
            notifier,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a structured-mode CloudEvent.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, &body.to_string(), "application/cloudevents+json")
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str, content_type: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a binary-mode CloudEvent: attributes as `ce-*` headers.
    pub async fn post_binary(
        &self,
        path: &str,
        attributes: &[(&str, &str)],
        data: Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in attributes {
            builder = builder.header(format!("ce-{}", name), *value);
        }
        let request = builder.body(Body::from(data.to_string())).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
