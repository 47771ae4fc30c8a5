use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zendesk_bridge_core::{
    config::parse_flag, load_config, load_config_from_env, missing_mandatory, validate_config,
    Config, ConfigError, DynatraceClient, EventBridge, NotificationSink, SanitizedConfig,
    TicketSink, ZendeskClient,
};

use zendesk_bridge_server::api::create_router;
use zendesk_bridge_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging (ZENDESK_BRIDGE_LOG_FORMAT=json for JSON lines)
    let json_logs = std::env::var("ZENDESK_BRIDGE_LOG_FORMAT").is_ok_and(|v| v == "json");
    let (plain_layer, json_layer) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };
    // The legacy DEBUG flag only applies when RUST_LOG is unset
    let default_filter = if std::env::var("DEBUG").is_ok_and(|v| parse_flag(&v)) {
        "debug"
    } else {
        "info,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(plain_layer)
        .with(json_layer)
        .init();

    info!("Starting zendesk-service {}", VERSION);

    // Determine config path
    let config_path = std::env::var("ZENDESK_BRIDGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration; the file is optional for env-only deployments
    let config = match load_config(&config_path) {
        Ok(config) => {
            info!("Loaded configuration from {:?}", config_path);
            config
        }
        Err(ConfigError::FileNotFound(_)) => {
            info!(
                "No config file at {:?}, using environment only",
                config_path
            );
            load_config_from_env().context("Failed to load config from environment")?
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))
        }
    };

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    for missing in missing_mandatory(&config) {
        error!("Mandatory setting {} is not set", missing);
    }
    debug!(
        "Configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );
    info!(
        ticket_for_evaluations = config.zendesk.ticket_for_evaluations,
        ticket_for_problems = config.zendesk.ticket_for_problems,
        send_event = config.forwarding.send_event,
        "Configuration loaded successfully"
    );

    let config = Arc::new(config);
    let bridge = build_bridge(Arc::clone(&config))?;

    // Create app state
    let state = Arc::new(AppState::new(Arc::clone(&config), bridge));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Listening for CloudEvents on {}{}", addr, config.server.path);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wire the Zendesk client and, when forwarding is possible, the Dynatrace client.
fn build_bridge(config: Arc<Config>) -> Result<EventBridge> {
    let tickets: Arc<dyn TicketSink> = Arc::new(
        ZendeskClient::new(config.zendesk.clone()).context("Failed to create Zendesk client")?,
    );

    let dynatrace = &config.forwarding.dynatrace;
    let notifier: Option<Arc<dyn NotificationSink>> = if !config.forwarding.send_event {
        info!("Event forwarding disabled");
        None
    } else if !dynatrace.has_credentials() {
        warn!("Event forwarding enabled but Dynatrace tenant or API token is missing");
        None
    } else {
        let client = DynatraceClient::new(dynatrace.clone())
            .context("Failed to create Dynatrace client")?;
        info!("Forwarding events to {}", client.events_url());
        Some(Arc::new(client))
    };

    let bridge = EventBridge::new(Arc::clone(&config), tickets);
    Ok(match notifier {
        Some(notifier) => bridge.with_notifier(notifier),
        None => bridge,
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
