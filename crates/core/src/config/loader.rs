use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use super::{types::Config, ConfigError};

/// Prefix for structured environment overrides, nested with `__`
/// (e.g., `ZENDESK_BRIDGE_ZENDESK__BASE_URL`).
pub const ENV_PREFIX: &str = "ZENDESK_BRIDGE_";

#[derive(Clone, Copy)]
enum LegacyKind {
    Text,
    Flag,
    Port,
}

/// Flat environment variables understood by existing deployments.
const LEGACY_ENV: &[(&str, &str, &str, LegacyKind)] = &[
    ("RCV_PORT", "server", "port", LegacyKind::Port),
    ("RCV_PATH", "server", "path", LegacyKind::Text),
    ("ZENDESK_BASE_URL", "zendesk", "base_url", LegacyKind::Text),
    ("ZENDESK_END_USER_EMAIL", "zendesk", "end_user_email", LegacyKind::Text),
    ("ZENDESK_API_TOKEN", "zendesk", "api_token", LegacyKind::Text),
    ("ZENDESK_TICKET_FOR_PROBLEMS", "zendesk", "ticket_for_problems", LegacyKind::Flag),
    ("ZENDESK_TICKET_FOR_EVALUATIONS", "zendesk", "ticket_for_evaluations", LegacyKind::Flag),
    ("KEPTN_DOMAIN", "keptn", "domain", LegacyKind::Text),
    ("KEPTN_BRIDGE_URL", "keptn", "bridge_url", LegacyKind::Text),
    ("SEND_EVENT", "forwarding", "send_event", LegacyKind::Flag),
];

/// Dynatrace credentials live one level deeper, under `forwarding.dynatrace`.
const LEGACY_DYNATRACE_ENV: &[(&str, &str)] = &[
    ("DT_TENANT", "tenant"),
    ("DT_API_TOKEN", "api_token"),
];

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Serialized::defaults(legacy_overrides(|name| {
            std::env::var(name).ok()
        })))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Build a nested override document from the legacy variables.
///
/// Empty values are skipped so they never clobber file settings. Flags follow
/// the permissive parsing existing deployments rely on: anything that is not
/// a recognised "true" spelling counts as false.
fn legacy_overrides<F>(lookup: F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    let mut sections: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();

    for (name, section, key, kind) in LEGACY_ENV {
        let Some(raw) = lookup(name).filter(|v| !v.is_empty()) else {
            continue;
        };

        let value = match kind {
            LegacyKind::Text => Value::String(raw),
            LegacyKind::Flag => Value::Bool(parse_flag(&raw)),
            LegacyKind::Port => match raw.trim().parse::<u16>() {
                Ok(port) => Value::from(port),
                Err(_) => {
                    warn!("Ignoring {}: '{}' is not a valid port", name, raw);
                    continue;
                }
            },
        };

        sections
            .entry(section)
            .or_default()
            .insert((*key).to_string(), value);
    }

    let dynatrace: Map<String, Value> = LEGACY_DYNATRACE_ENV
        .iter()
        .filter_map(|(name, key)| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .map(|raw| ((*key).to_string(), Value::String(raw)))
        })
        .collect();
    if !dynatrace.is_empty() {
        sections
            .entry("forwarding")
            .or_default()
            .insert("dynatrace".to_string(), Value::Object(dynatrace));
    }

    Value::Object(
        sections
            .into_iter()
            .map(|(section, map)| (section.to_string(), Value::Object(map)))
            .collect(),
    )
}

/// Boolean flag from an environment value: `1`, `t`, `T`, `true`, `TRUE`
/// and `True` are true, anything else is false.
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "t" | "T" | "true" | "TRUE" | "True")
}
