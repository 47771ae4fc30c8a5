//! The event bridge.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::types::{HandledEvent, NotificationStatus};
use crate::config::Config;
use crate::event::{classify, EventError, EventKind, InboundEvent, Outcome};
use crate::metrics;
use crate::notification::{compose_notification, NotificationGate, NotificationSink};
use crate::ticket::{build_ticket, CreatedTicket, StageLabelKey, TicketSink};

/// Turns inbound Keptn events into Zendesk tickets and Dynatrace events.
pub struct EventBridge {
    config: Arc<Config>,
    tickets: Arc<dyn TicketSink>,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl EventBridge {
    /// Create a bridge without a notifier; notifications are always skipped.
    pub fn new(config: Arc<Config>, tickets: Arc<dyn TicketSink>) -> Self {
        Self {
            config,
            tickets,
            notifier: None,
        }
    }

    /// Attach the notifier used for secondary notifications.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Handle one inbound event.
    ///
    /// Only envelope/payload problems are returned as errors. Ticket and
    /// notification failures are logged and reflected in the returned
    /// [`HandledEvent`].
    pub async fn handle(&self, event: &InboundEvent) -> Result<HandledEvent, EventError> {
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            keptn_context = %event.shkeptncontext,
            "Received event"
        );

        let outcome = match classify(event) {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                metrics::EVENTS_RECEIVED
                    .with_label_values(&["other", "ignored"])
                    .inc();
                return Ok(HandledEvent::Ignored {
                    event_type: event.event_type.clone(),
                });
            }
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Rejecting event");
                metrics::EVENTS_RECEIVED
                    .with_label_values(&["other", "invalid"])
                    .inc();
                return Err(e);
            }
        };

        let kind = outcome.kind();
        let handled = self.process(kind, &outcome, event.correlation_context()).await;

        metrics::EVENTS_RECEIVED
            .with_label_values(&[kind.as_str(), handled.as_str()])
            .inc();
        Ok(handled)
    }

    async fn process(&self, kind: EventKind, outcome: &Outcome, keptn_context: &str) -> HandledEvent {
        if !self.tickets_enabled(kind) {
            info!(
                kind = %kind,
                "Tickets are disabled for {} events, doing nothing", kind
            );
            return HandledEvent::Disabled { kind };
        }

        let bridge_base_url = self.config.keptn.bridge_base_url();
        let content = build_ticket(
            outcome,
            keptn_context,
            bridge_base_url,
            StageLabelKey::from_legacy_flag(self.config.zendesk.legacy_stage_label),
        );

        debug!(title = %content.title, labels = ?content.labels, "Rendered ticket");

        let ticket_id = match self.tickets.create_ticket(&content).await {
            Ok(id) => {
                info!(ticket_id = %id, backend = self.tickets.name(), "Ticket created");
                metrics::TICKETS_CREATED
                    .with_label_values(&[kind.as_str(), "created"])
                    .inc();
                id
            }
            Err(e) => {
                warn!(
                    kind = %kind,
                    backend = self.tickets.name(),
                    error = %e,
                    "Ticket creation failed, continuing without a ticket id"
                );
                metrics::TICKETS_CREATED
                    .with_label_values(&[kind.as_str(), "failed"])
                    .inc();
                String::new()
            }
        };
        let ticket = CreatedTicket::new(ticket_id, &self.config.zendesk);

        let notification = self.forward(kind, outcome, &ticket, keptn_context).await;

        HandledEvent::Processed {
            kind,
            ticket,
            notification,
        }
    }

    fn tickets_enabled(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::EvaluationFinished => self.config.zendesk.ticket_for_evaluations,
            EventKind::RemediationFinished => self.config.zendesk.ticket_for_problems,
        }
    }

    async fn forward(
        &self,
        kind: EventKind,
        outcome: &Outcome,
        ticket: &CreatedTicket,
        keptn_context: &str,
    ) -> NotificationStatus {
        let destination = self.config.forwarding.destination.as_str();
        let gate = NotificationGate::from_config(&self.config, kind);
        if !gate.allows() {
            debug!(destination, ?gate, "Not sending notification");
            metrics::NOTIFICATIONS
                .with_label_values(&[destination, "skipped"])
                .inc();
            return NotificationStatus::Skipped;
        }

        let Some(notifier) = &self.notifier else {
            debug!(destination, "No notifier configured");
            metrics::NOTIFICATIONS
                .with_label_values(&[destination, "skipped"])
                .inc();
            return NotificationStatus::Skipped;
        };

        let notification = compose_notification(
            &self.config.forwarding.dynatrace.event_type,
            &ticket.url,
            outcome,
            keptn_context,
            self.config.keptn.bridge_base_url(),
        );

        info!(
            destination = %notifier.destination(),
            event_type = %notification.event_type,
            "Sending notification"
        );

        match notifier.send(&notification).await {
            Ok(()) => {
                metrics::NOTIFICATIONS
                    .with_label_values(&[notifier.destination().as_str(), "sent"])
                    .inc();
                NotificationStatus::Sent
            }
            Err(e) => {
                warn!(
                    destination = %notifier.destination(),
                    error = %e,
                    "Failed to send notification"
                );
                metrics::NOTIFICATIONS
                    .with_label_values(&[notifier.destination().as_str(), "failed"])
                    .inc();
                NotificationStatus::Failed(e.to_string())
            }
        }
    }
}
