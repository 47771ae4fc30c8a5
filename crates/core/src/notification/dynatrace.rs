//! Dynatrace Events API v1 client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{Destination, NotificationError, NotificationSink, SecondaryNotification};
use crate::config::DynatraceConfig;
use crate::metrics;

/// Dynatrace API client.
pub struct DynatraceClient {
    client: Client,
    events_url: String,
    api_token: String,
}

impl DynatraceClient {
    /// Create a new Dynatrace client.
    pub fn new(config: DynatraceConfig) -> Result<Self, NotificationError> {
        if !config.has_credentials() {
            return Err(NotificationError::NotConfigured(
                "Dynatrace tenant and API token are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            events_url: events_url(&config.tenant),
            api_token: config.api_token,
        })
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }
}

/// Tenants are usually bare hosts; a value with a scheme is used as given.
fn events_url(tenant: &str) -> String {
    let tenant = tenant.trim_end_matches('/');
    if tenant.starts_with("http://") || tenant.starts_with("https://") {
        format!("{}/api/v1/events", tenant)
    } else {
        format!("https://{}/api/v1/events", tenant)
    }
}

#[async_trait]
impl NotificationSink for DynatraceClient {
    async fn send(&self, notification: &SecondaryNotification) -> Result<(), NotificationError> {
        debug!(url = %self.events_url, title = %notification.title, "Sending Dynatrace event");

        let start = Instant::now();
        let result = self
            .client
            .post(&self.events_url)
            .header("accept", "application/json")
            .header("Authorization", format!("Api-Token {}", self.api_token))
            .json(notification)
            .send()
            .await;
        metrics::DOWNSTREAM_DURATION
            .with_label_values(&["dynatrace"])
            .observe(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            if e.is_timeout() {
                NotificationError::Timeout
            } else {
                NotificationError::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }

    fn destination(&self) -> Destination {
        Destination::Dynatrace
    }
}
