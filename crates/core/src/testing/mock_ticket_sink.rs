//! Mock ticket sink for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ticket::{TicketContent, TicketError, TicketSink};

/// Mock implementation of the TicketSink trait.
///
/// Records every ticket it is asked to create. Ids are handed out from a
/// counter starting at 1 unless one is queued with [`set_next_id`](Self::set_next_id).
#[derive(Debug)]
pub struct MockTicketSink {
    /// Every content passed to `create_ticket`, including failed calls.
    created: Arc<RwLock<Vec<TicketContent>>>,
    /// If set, the next call returns this id.
    next_id: Arc<RwLock<Option<String>>>,
    /// If set, the next call fails with an API error carrying this message.
    next_error: Arc<RwLock<Option<String>>>,
    counter: Arc<RwLock<u64>>,
}

impl Default for MockTicketSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketSink {
    pub fn new() -> Self {
        Self {
            created: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
            counter: Arc::new(RwLock::new(0)),
        }
    }

    /// All ticket contents received so far.
    pub async fn created(&self) -> Vec<TicketContent> {
        self.created.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.created.read().await.len()
    }

    /// Return `id` from the next call.
    pub async fn set_next_id(&self, id: impl Into<String>) {
        *self.next_id.write().await = Some(id.into());
    }

    /// Fail the next call.
    pub async fn fail_next(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }
}

#[async_trait]
impl TicketSink for MockTicketSink {
    async fn create_ticket(&self, content: &TicketContent) -> Result<String, TicketError> {
        self.created.write().await.push(content.clone());

        if let Some(message) = self.next_error.write().await.take() {
            return Err(TicketError::ApiError {
                status: 500,
                message,
            });
        }

        if let Some(id) = self.next_id.write().await.take() {
            return Ok(id);
        }

        let mut counter = self.counter.write().await;
        *counter += 1;
        Ok(counter.to_string())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
