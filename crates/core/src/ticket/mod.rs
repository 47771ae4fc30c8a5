//! Ticket rendering and creation in Zendesk.

mod content;
mod zendesk;

pub use content::*;
pub use zendesk::ZendeskClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::ZendeskConfig;

/// Errors that can occur while creating a ticket.
#[derive(Debug, Error)]
pub enum TicketError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing base URL, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Something that can create tickets.
#[async_trait]
pub trait TicketSink: Send + Sync {
    /// Create a ticket and return its identifier.
    async fn create_ticket(&self, content: &TicketContent) -> Result<String, TicketError>;

    /// Name of the ticketing backend.
    fn name(&self) -> &'static str;
}

/// A ticket as created in the ticketing system.
///
/// `id` is empty when creation failed; `url` then points at the ticket list
/// root and carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedTicket {
    pub id: String,
    pub url: String,
}

impl CreatedTicket {
    pub fn new(id: impl Into<String>, config: &ZendeskConfig) -> Self {
        let id = id.into();
        let url = config.ticket_url(&id);
        Self { id, url }
    }

    pub fn is_created(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_ticket_url() {
        let config = ZendeskConfig {
            base_url: "https://acme.zendesk.com".to_string(),
            ..Default::default()
        };

        for id in ["1", "42", "98765"] {
            let ticket = CreatedTicket::new(id, &config);
            assert!(ticket.is_created());
            assert_eq!(
                ticket.url,
                format!("{}/agent/tickets/{}", config.base_url, id)
            );
        }
    }

    #[test]
    fn test_empty_ticket_is_not_created() {
        let ticket = CreatedTicket::new("", &ZendeskConfig::default());
        assert!(!ticket.is_created());
        assert_eq!(ticket.url, "/agent/tickets/");
    }
}
