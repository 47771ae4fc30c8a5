//! Prometheus metrics for observability.
//!
//! This module provides the HTTP request metrics of the receiver and
//! registers the core pipeline metrics (events, tickets, notifications and
//! downstream latency) in one registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "zendesk_bridge_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("zendesk_bridge_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "zendesk_bridge_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Core metrics (events, tickets, notifications, downstream latency)
    for metric in zendesk_bridge_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Path label for a request.
///
/// Uses the matched route template so label cardinality stays bounded;
/// requests that matched no route share one label.
pub fn normalize_path(matched: Option<&str>) -> String {
    match matched {
        Some(path) => path.to_string(),
        None => "unmatched".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_matched() {
        assert_eq!(normalize_path(Some("/health")), "/health");
        assert_eq!(normalize_path(Some("/")), "/");
    }

    #[test]
    fn test_normalize_path_unmatched() {
        assert_eq!(normalize_path(None), "unmatched");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("zendesk_bridge_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        // Prometheus only outputs vectors that have at least one child
        zendesk_bridge_core::metrics::EVENTS_RECEIVED
            .with_label_values(&["evaluation", "processed"])
            .inc_by(0);
        zendesk_bridge_core::metrics::TICKETS_CREATED
            .with_label_values(&["evaluation", "created"])
            .inc_by(0);
        zendesk_bridge_core::metrics::NOTIFICATIONS
            .with_label_values(&["dynatrace", "sent"])
            .inc_by(0);
        HTTP_REQUESTS_IN_FLIGHT.set(0);

        let output = encode_metrics().unwrap();

        assert!(output.contains("zendesk_bridge_http_requests_in_flight"));
        assert!(output.contains("zendesk_bridge_events_total"));
        assert!(output.contains("zendesk_bridge_tickets_total"));
        assert!(output.contains("zendesk_bridge_notifications_total"));
    }
}
