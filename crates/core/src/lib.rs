pub mod config;
pub mod event;
pub mod metrics;
pub mod notification;
pub mod pipeline;
pub mod testing;
pub mod ticket;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, missing_mandatory, validate_config,
    Config, ConfigError, SanitizedConfig,
};
pub use event::{classify, EventError, EventKind, InboundEvent, Outcome, ResultKind};
pub use notification::{
    compose_notification, Destination, DynatraceClient, NotificationError, NotificationGate,
    NotificationSink, SecondaryNotification,
};
pub use pipeline::{EventBridge, HandledEvent, NotificationStatus};
pub use ticket::{build_ticket, CreatedTicket, TicketContent, TicketError, TicketSink, ZendeskClient};
