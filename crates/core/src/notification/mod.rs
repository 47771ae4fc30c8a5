//! Secondary notifications cross-referencing created tickets.
//!
//! Only Dynatrace is supported as a destination. Sending is best-effort:
//! failures are reported to the caller but never undo ticket creation.

mod compose;
mod dynatrace;
mod types;

pub use compose::*;
pub use dynatrace::DynatraceClient;
pub use types::*;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::config::Config;
use crate::event::EventKind;

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Client not configured (missing tenant, token, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Supported notification destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Dynatrace,
}

impl Destination {
    /// Match a configured destination name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "dynatrace" => Some(Self::Dynatrace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynatrace => "dynatrace",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can deliver secondary notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: &SecondaryNotification) -> Result<(), NotificationError>;

    fn destination(&self) -> Destination;
}

/// Conditions that must all hold for a notification to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationGate {
    /// Tickets (and thus notifications) are enabled for this event kind.
    pub kind_enabled: bool,
    /// Global forwarding switch (`SEND_EVENT`).
    pub forwarding_enabled: bool,
    /// The configured destination is supported.
    pub destination_known: bool,
    /// Tenant and token are configured for the destination.
    pub credentials_present: bool,
}

impl NotificationGate {
    pub fn from_config(config: &Config, kind: EventKind) -> Self {
        let kind_enabled = match kind {
            EventKind::EvaluationFinished => config.zendesk.ticket_for_evaluations,
            EventKind::RemediationFinished => config.zendesk.ticket_for_problems,
        };
        let destination = Destination::parse(&config.forwarding.destination);
        let credentials_present = match destination {
            Some(Destination::Dynatrace) => config.forwarding.dynatrace.has_credentials(),
            None => false,
        };

        Self {
            kind_enabled,
            forwarding_enabled: config.forwarding.send_event,
            destination_known: destination.is_some(),
            credentials_present,
        }
    }

    pub fn allows(&self) -> bool {
        self.kind_enabled
            && self.forwarding_enabled
            && self.destination_known
            && self.credentials_present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: bool, global: bool, creds: bool, destination: &str) -> Config {
        let mut config = Config::default();
        config.zendesk.ticket_for_evaluations = kind;
        config.forwarding.send_event = global;
        config.forwarding.destination = destination.to_string();
        if creds {
            config.forwarding.dynatrace.tenant = "abc.live.dynatrace.com".to_string();
            config.forwarding.dynatrace.api_token = "token".to_string();
        }
        config
    }

    #[test]
    fn test_destination_parse() {
        assert_eq!(Destination::parse("dynatrace"), Some(Destination::Dynatrace));
        assert_eq!(Destination::parse("Dynatrace"), None);
        assert_eq!(Destination::parse("splunk"), None);
        assert_eq!(Destination::Dynatrace.to_string(), "dynatrace");
    }

    #[test]
    fn test_gate_truth_table() {
        for bits in 0..16u8 {
            let kind = bits & 1 != 0;
            let global = bits & 2 != 0;
            let creds = bits & 4 != 0;
            let known = bits & 8 != 0;
            let destination = if known { "dynatrace" } else { "splunk" };

            let gate = NotificationGate::from_config(
                &config(kind, global, creds, destination),
                EventKind::EvaluationFinished,
            );
            assert_eq!(
                gate.allows(),
                kind && global && creds && known,
                "kind={kind} global={global} creds={creds} known={known}"
            );
        }
    }

    #[test]
    fn test_gate_uses_flag_of_event_kind() {
        let mut config = config(true, true, true, "dynatrace");
        config.zendesk.ticket_for_problems = false;

        assert!(NotificationGate::from_config(&config, EventKind::EvaluationFinished).allows());
        assert!(!NotificationGate::from_config(&config, EventKind::RemediationFinished).allows());
    }

    #[test]
    fn test_gate_requires_both_credentials() {
        let mut config = config(true, true, false, "dynatrace");
        config.forwarding.dynatrace.tenant = "abc.live.dynatrace.com".to_string();
        let gate = NotificationGate::from_config(&config, EventKind::EvaluationFinished);
        assert!(!gate.credentials_present);
        assert!(!gate.allows());
    }
}
