//! Zendesk Requests API client.
//!
//! Tickets are created as end-user requests, authenticated with an API token
//! on behalf of the configured end user.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TicketContent, TicketError, TicketSink};
use crate::config::ZendeskConfig;
use crate::metrics;

/// Zendesk API client.
pub struct ZendeskClient {
    client: Client,
    config: ZendeskConfig,
}

impl ZendeskClient {
    /// Create a new Zendesk client.
    ///
    /// An empty base URL is accepted here and reported per request, so the
    /// service can start with incomplete configuration.
    pub fn new(config: ZendeskConfig) -> Result<Self, TicketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self { client, config })
    }

    fn requests_url(&self) -> String {
        format!(
            "{}/api/v2/requests.json",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request<'a>(&'a self, content: &'a TicketContent) -> ZendeskTicketRequest<'a> {
        ZendeskTicketRequest {
            request: ZendeskRequest {
                requester: ZendeskRequester {
                    name: &self.config.requester_name,
                },
                subject: &content.title,
                comment: ZendeskComment {
                    html_body: &content.body,
                },
                tags: &content.labels,
            },
        }
    }
}

#[async_trait]
impl TicketSink for ZendeskClient {
    async fn create_ticket(&self, content: &TicketContent) -> Result<String, TicketError> {
        if self.config.base_url.is_empty() {
            return Err(TicketError::NotConfigured(
                "Zendesk base URL is required".to_string(),
            ));
        }

        let url = self.requests_url();
        debug!(url = %url, subject = %content.title, "Creating Zendesk request");

        let start = Instant::now();
        let result = self
            .client
            .post(&url)
            .basic_auth(
                format!("{}/token", self.config.end_user_email),
                Some(&self.config.api_token),
            )
            .json(&self.build_request(content))
            .send()
            .await;
        metrics::DOWNSTREAM_DURATION
            .with_label_values(&["zendesk"])
            .observe(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            if e.is_timeout() {
                TicketError::Timeout
            } else {
                TicketError::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TicketError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: ZendeskTicketResponse = response.json().await.map_err(|e| {
            TicketError::ParseError(format!("Failed to parse request response: {}", e))
        })?;

        debug!(
            ticket_id = created.request.id,
            status = created.request.status.as_deref().unwrap_or("unknown"),
            "Zendesk request created"
        );

        Ok(created.request.id.to_string())
    }

    fn name(&self) -> &'static str {
        "zendesk"
    }
}

// ============================================================================
// Zendesk API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ZendeskTicketRequest<'a> {
    request: ZendeskRequest<'a>,
}

#[derive(Debug, Serialize)]
struct ZendeskRequest<'a> {
    requester: ZendeskRequester<'a>,
    subject: &'a str,
    comment: ZendeskComment<'a>,
    tags: &'a [String],
}

#[derive(Debug, Serialize)]
struct ZendeskRequester<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ZendeskComment<'a> {
    html_body: &'a str,
}

#[derive(Debug, Deserialize)]
struct ZendeskTicketResponse {
    request: ZendeskResponseRequest,
}

#[derive(Debug, Deserialize)]
struct ZendeskResponseRequest {
    id: u64,
    #[serde(default)]
    status: Option<String>,
}
