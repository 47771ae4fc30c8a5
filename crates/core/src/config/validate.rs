use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Receive path starts with '/'
/// - Client timeouts are not 0
///
/// Missing Zendesk or Keptn settings are not errors here, see
/// [`missing_mandatory`].
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if !config.server.path.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "server.path must start with '/', got '{}'",
            config.server.path
        )));
    }

    if config.zendesk.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "zendesk.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.forwarding.dynatrace.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "forwarding.dynatrace.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// Names of mandatory settings that are unset.
///
/// The service still starts without them so each event can report the
/// problem; every ticket creation fails until they are provided.
pub fn missing_mandatory(config: &Config) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.zendesk.base_url.is_empty() {
        missing.push("zendesk.base_url (ZENDESK_BASE_URL)");
    }
    if config.keptn.domain.is_empty() {
        missing.push("keptn.domain (KEPTN_DOMAIN)");
    }
    missing
}
