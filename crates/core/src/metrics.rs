//! Prometheus metrics for the event pipeline.
//!
//! This module provides metrics for:
//! - Inbound events (by kind and how they were handled)
//! - Ticket creation in Zendesk
//! - Secondary notifications
//! - Downstream request latency

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Events
// =============================================================================

/// Events received by kind and handling outcome.
pub static EVENTS_RECEIVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("zendesk_bridge_events_total", "Total events received"),
        &["kind", "outcome"], // outcome: "processed", "ignored", "disabled", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Downstream
// =============================================================================

/// Ticket creation attempts by event kind and result.
pub static TICKETS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zendesk_bridge_tickets_total",
            "Total ticket creation attempts",
        ),
        &["kind", "result"], // "created", "failed"
    )
    .unwrap()
});

/// Secondary notifications by destination and result.
pub static NOTIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zendesk_bridge_notifications_total",
            "Total secondary notifications",
        ),
        &["destination", "result"], // "sent", "skipped", "failed"
    )
    .unwrap()
});

/// Downstream request duration in seconds.
pub static DOWNSTREAM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "zendesk_bridge_downstream_request_duration_seconds",
            "Duration of requests to Zendesk and Dynatrace",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["target"], // "zendesk", "dynatrace"
    )
    .unwrap()
});

/// All core metrics, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(EVENTS_RECEIVED.clone()),
        Box::new(TICKETS_CREATED.clone()),
        Box::new(NOTIFICATIONS.clone()),
        Box::new(DOWNSTREAM_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_once() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        EVENTS_RECEIVED
            .with_label_values(&["evaluation", "processed"])
            .inc();
        let names: Vec<_> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"zendesk_bridge_events_total".to_string()));
    }
}
