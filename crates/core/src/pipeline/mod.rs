//! Event pipeline: classify → render ticket → create ticket → notify.
//!
//! Each event is handled independently; nothing is carried over between
//! events besides the read-only configuration and the shared HTTP clients.

mod bridge;
mod types;

pub use bridge::EventBridge;
pub use types::{HandledEvent, NotificationStatus};
