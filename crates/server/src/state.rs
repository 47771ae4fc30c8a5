use std::sync::Arc;
use zendesk_bridge_core::{Config, EventBridge, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Arc<Config>,
    bridge: EventBridge,
}

impl AppState {
    pub fn new(config: Arc<Config>, bridge: EventBridge) -> Self {
        Self { config, bridge }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(self.config.as_ref())
    }

    pub fn bridge(&self) -> &EventBridge {
        &self.bridge
    }
}
