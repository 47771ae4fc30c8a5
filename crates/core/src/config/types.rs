use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub zendesk: ZendeskConfig,
    #[serde(default)]
    pub keptn: KeptnConfig,
    #[serde(default)]
    pub forwarding: ForwardingConfig,
}

/// Server configuration (CloudEvent receiver)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path on which CloudEvents are received
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/".to_string()
}

/// Zendesk ticketing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZendeskConfig {
    /// Zendesk instance URL (e.g., "https://example.zendesk.com")
    #[serde(default)]
    pub base_url: String,
    /// End user the API token belongs to
    #[serde(default)]
    pub end_user_email: String,
    /// Zendesk API token
    #[serde(default)]
    pub api_token: String,
    /// Name shown as the requester of created tickets
    #[serde(default = "default_requester_name")]
    pub requester_name: String,
    /// Create tickets for remediation.finished events
    #[serde(default)]
    pub ticket_for_problems: bool,
    /// Create tickets for evaluation.finished events
    #[serde(default)]
    pub ticket_for_evaluations: bool,
    /// Label the stage as `keptn_service:<stage>` like earlier releases did
    #[serde(default)]
    pub legacy_stage_label: bool,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for ZendeskConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            end_user_email: String::new(),
            api_token: String::new(),
            requester_name: default_requester_name(),
            ticket_for_problems: false,
            ticket_for_evaluations: false,
            legacy_stage_label: false,
            timeout_secs: default_timeout(),
        }
    }
}

impl ZendeskConfig {
    /// URL of the agent view for a ticket id.
    pub fn ticket_url(&self, ticket_id: &str) -> String {
        format!(
            "{}/agent/tickets/{}",
            self.base_url.trim_end_matches('/'),
            ticket_id
        )
    }
}

fn default_requester_name() -> String {
    "Keptn".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Keptn installation details
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KeptnConfig {
    /// Keptn domain (mandatory)
    #[serde(default)]
    pub domain: String,
    /// Keptn's Bridge URL, falls back to `domain` when empty
    #[serde(default)]
    pub bridge_url: String,
}

impl KeptnConfig {
    /// Base URL used for back-links into Keptn's Bridge.
    pub fn bridge_base_url(&self) -> &str {
        if self.bridge_url.is_empty() {
            &self.domain
        } else {
            &self.bridge_url
        }
    }
}

/// Secondary notification forwarding
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForwardingConfig {
    /// Global switch for sending secondary notifications
    #[serde(default)]
    pub send_event: bool,
    /// Where notifications go (only "dynatrace" is supported)
    #[serde(default = "default_destination")]
    pub destination: String,
    #[serde(default)]
    pub dynatrace: DynatraceConfig,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            send_event: false,
            destination: default_destination(),
            dynatrace: DynatraceConfig::default(),
        }
    }
}

fn default_destination() -> String {
    "dynatrace".to_string()
}

/// Dynatrace tenant credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynatraceConfig {
    /// Tenant host (e.g., "abc12345.live.dynatrace.com")
    #[serde(default)]
    pub tenant: String,
    /// API token with the events ingest scope
    #[serde(default)]
    pub api_token: String,
    /// Event type of the info events (default: CUSTOM_INFO)
    #[serde(default = "default_event_type")]
    pub event_type: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for DynatraceConfig {
    fn default() -> Self {
        Self {
            tenant: String::new(),
            api_token: String::new(),
            event_type: default_event_type(),
            timeout_secs: default_timeout(),
        }
    }
}

impl DynatraceConfig {
    /// Both tenant and token are set.
    pub fn has_credentials(&self) -> bool {
        !self.tenant.is_empty() && !self.api_token.is_empty()
    }
}

fn default_event_type() -> String {
    "CUSTOM_INFO".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub zendesk: SanitizedZendeskConfig,
    pub keptn: KeptnConfig,
    pub forwarding: SanitizedForwardingConfig,
}

/// Sanitized Zendesk config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedZendeskConfig {
    pub base_url: String,
    pub end_user_email: String,
    pub api_token_configured: bool,
    pub requester_name: String,
    pub ticket_for_problems: bool,
    pub ticket_for_evaluations: bool,
    pub legacy_stage_label: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedForwardingConfig {
    pub send_event: bool,
    pub destination: String,
    pub dynatrace: SanitizedDynatraceConfig,
}

/// Sanitized Dynatrace config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDynatraceConfig {
    pub tenant: String,
    pub api_token_configured: bool,
    pub event_type: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let zendesk = &config.zendesk;
        let dynatrace = &config.forwarding.dynatrace;
        Self {
            server: config.server.clone(),
            zendesk: SanitizedZendeskConfig {
                base_url: zendesk.base_url.clone(),
                end_user_email: zendesk.end_user_email.clone(),
                api_token_configured: !zendesk.api_token.is_empty(),
                requester_name: zendesk.requester_name.clone(),
                ticket_for_problems: zendesk.ticket_for_problems,
                ticket_for_evaluations: zendesk.ticket_for_evaluations,
                legacy_stage_label: zendesk.legacy_stage_label,
                timeout_secs: zendesk.timeout_secs,
            },
            keptn: config.keptn.clone(),
            forwarding: SanitizedForwardingConfig {
                send_event: config.forwarding.send_event,
                destination: config.forwarding.destination.clone(),
                dynatrace: SanitizedDynatraceConfig {
                    tenant: dynatrace.tenant.clone(),
                    api_token_configured: !dynatrace.api_token.is_empty(),
                    event_type: dynatrace.event_type.clone(),
                    timeout_secs: dynatrace.timeout_secs,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.path, "/");
        assert_eq!(config.zendesk.requester_name, "Keptn");
        assert_eq!(config.zendesk.timeout_secs, 30);
        assert!(!config.zendesk.ticket_for_problems);
        assert!(!config.zendesk.ticket_for_evaluations);
        assert!(!config.forwarding.send_event);
        assert_eq!(config.forwarding.destination, "dynatrace");
        assert_eq!(config.forwarding.dynatrace.event_type, "CUSTOM_INFO");
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
path = "/events"

[zendesk]
base_url = "https://acme.zendesk.com"
end_user_email = "ops@acme.io"
api_token = "zd-token"
ticket_for_problems = true
ticket_for_evaluations = true

[keptn]
domain = "keptn.acme.io"
bridge_url = "https://bridge.acme.io"

[forwarding]
send_event = true

[forwarding.dynatrace]
tenant = "abc123.live.dynatrace.com"
api_token = "dt-token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.path, "/events");
        assert_eq!(config.zendesk.base_url, "https://acme.zendesk.com");
        assert!(config.zendesk.ticket_for_problems);
        assert_eq!(config.keptn.bridge_base_url(), "https://bridge.acme.io");
        assert!(config.forwarding.send_event);
        assert!(config.forwarding.dynatrace.has_credentials());
    }

    #[test]
    fn test_bridge_url_falls_back_to_domain() {
        let keptn = KeptnConfig {
            domain: "keptn.acme.io".to_string(),
            bridge_url: String::new(),
        };
        assert_eq!(keptn.bridge_base_url(), "keptn.acme.io");
    }

    #[test]
    fn test_ticket_url() {
        let zendesk = ZendeskConfig {
            base_url: "https://acme.zendesk.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            zendesk.ticket_url("42"),
            "https://acme.zendesk.com/agent/tickets/42"
        );
        assert_eq!(
            zendesk.ticket_url(""),
            "https://acme.zendesk.com/agent/tickets/"
        );
    }

    #[test]
    fn test_dynatrace_credentials_require_both_values() {
        let mut dt = DynatraceConfig {
            tenant: "abc.live.dynatrace.com".to_string(),
            ..Default::default()
        };
        assert!(!dt.has_credentials());
        dt.api_token = "token".to_string();
        assert!(dt.has_credentials());
        dt.tenant.clear();
        assert!(!dt.has_credentials());
    }

    #[test]
    fn test_sanitized_config_hides_tokens() {
        let mut config = Config::default();
        config.zendesk.api_token = "secret".to_string();
        config.forwarding.dynatrace.api_token = String::new();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.zendesk.api_token_configured);
        assert!(!sanitized.forwarding.dynatrace.api_token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
