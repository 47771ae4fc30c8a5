use serde::Serialize;

use crate::event::EventKind;
use crate::ticket::CreatedTicket;

/// What happened to the secondary notification of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    /// The gate was closed or no notifier is configured.
    Skipped,
    /// Sending was attempted and failed.
    Failed(String),
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of handling one inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandledEvent {
    /// The event type is not one this service reacts to.
    Ignored { event_type: String },
    /// Tickets are disabled for this event kind.
    Disabled { kind: EventKind },
    /// A ticket was attempted and the notification path evaluated.
    Processed {
        kind: EventKind,
        ticket: CreatedTicket,
        notification: NotificationStatus,
    },
}

impl HandledEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignored { .. } => "ignored",
            Self::Disabled { .. } => "disabled",
            Self::Processed { .. } => "processed",
        }
    }
}
