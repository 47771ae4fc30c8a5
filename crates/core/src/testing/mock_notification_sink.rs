//! Mock notification sink for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notification::{Destination, NotificationError, NotificationSink, SecondaryNotification};

/// Mock implementation of the NotificationSink trait.
///
/// Records every notification, failed sends included.
#[derive(Debug)]
pub struct MockNotificationSink {
    sent: Arc<RwLock<Vec<SecondaryNotification>>>,
    /// If set, the next send fails with an API error carrying this message.
    next_error: Arc<RwLock<Option<String>>>,
}

impl Default for MockNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// All notifications received so far.
    pub async fn sent(&self) -> Vec<SecondaryNotification> {
        self.sent.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// Fail the next send.
    pub async fn fail_next(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }
}

#[async_trait]
impl NotificationSink for MockNotificationSink {
    async fn send(&self, notification: &SecondaryNotification) -> Result<(), NotificationError> {
        self.sent.write().await.push(notification.clone());

        match self.next_error.write().await.take() {
            Some(message) => Err(NotificationError::ApiError {
                status: 503,
                message,
            }),
            None => Ok(()),
        }
    }

    fn destination(&self) -> Destination {
        Destination::Dynatrace
    }
}
