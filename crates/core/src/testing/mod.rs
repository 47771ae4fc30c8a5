//! Testing utilities and mock implementations.
//!
//! Mocks for the two outbound seams ([`TicketSink`](crate::ticket::TicketSink)
//! and [`NotificationSink`](crate::notification::NotificationSink)) so the
//! bridge can be exercised without Zendesk or Dynatrace.
//!
//! # Example
//!
//! ```rust,ignore
//! use zendesk_bridge_core::testing::{fixtures, MockNotificationSink, MockTicketSink};
//!
//! let tickets = Arc::new(MockTicketSink::new());
//! tickets.set_next_id("42").await;
//!
//! let bridge = EventBridge::new(config, tickets.clone());
//! bridge.handle(&fixtures::evaluation_event("sockshop", "carts", "staging", "pass", 100.0)).await?;
//!
//! assert_eq!(tickets.created().await.len(), 1);
//! ```

mod mock_notification_sink;
mod mock_ticket_sink;

pub use mock_notification_sink::MockNotificationSink;
pub use mock_ticket_sink::MockTicketSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::config::Config;
    use crate::event::{InboundEvent, EVALUATION_FINISHED, REMEDIATION_FINISHED};

    /// Keptn context used by all fixture events.
    pub const KEPTN_CONTEXT: &str = "3c9ffbbb-6e1d-4789-9fee-6e63b4bcc1fb";

    /// An `evaluation.finished` event with the given outcome.
    pub fn evaluation_event(
        project: &str,
        service: &str,
        stage: &str,
        result: &str,
        score: f64,
    ) -> InboundEvent {
        InboundEvent::new(
            EVALUATION_FINISHED,
            KEPTN_CONTEXT,
            json!({
                "project": project,
                "service": service,
                "stage": stage,
                "result": result,
                "evaluation": {
                    "timeStart": "2021-03-01T10:00:00Z",
                    "timeEnd": "2021-03-01T10:05:00Z",
                    "result": result,
                    "score": score
                }
            }),
        )
    }

    /// A `remediation.finished` event with the given outcome.
    pub fn remediation_event(
        project: &str,
        service: &str,
        stage: &str,
        result: &str,
        message: &str,
    ) -> InboundEvent {
        InboundEvent::new(
            REMEDIATION_FINISHED,
            KEPTN_CONTEXT,
            json!({
                "project": project,
                "service": service,
                "stage": stage,
                "result": result,
                "message": message
            }),
        )
    }

    /// A config with both ticket kinds and forwarding switched on.
    pub fn enabled_config() -> Config {
        let mut config = Config::default();
        config.zendesk.base_url = "https://acme.zendesk.com".to_string();
        config.zendesk.end_user_email = "ops@acme.io".to_string();
        config.zendesk.api_token = "zd-token".to_string();
        config.zendesk.ticket_for_evaluations = true;
        config.zendesk.ticket_for_problems = true;
        config.keptn.domain = "https://keptn.acme.io".to_string();
        config.forwarding.send_event = true;
        config.forwarding.dynatrace.tenant = "abc12345.live.dynatrace.com".to_string();
        config.forwarding.dynatrace.api_token = "dt-token".to_string();
        config
    }
}
