//! league-ledger server entry point.
//!
//! Starts the Axum HTTP server with the character and DM-log REST
//! endpoints, and the audit logger task draining the event bus.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use league_ledger::api;
use league_ledger::app_state::AppState;
use league_ledger::config::LedgerConfig;
use league_ledger::domain::{EventBus, Ledger, LedgerEvent};
use league_ledger::service::{CharacterService, SummaryCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = LedgerConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("loading configuration")?;
    tracing::info!(addr = %config.listen_addr, "starting league-ledger");

    // Build domain layer
    let ledger = Arc::new(Ledger::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let cache = Arc::new(SummaryCache::new(config.cache_enabled));

    // Build service layer
    let character_service = Arc::new(CharacterService::new(ledger, cache, event_bus.clone()));

    // Audit logger: trace every ledger mutation flowing through the bus.
    spawn_audit_logger(event_bus.clone());

    // Build application state
    let app_state = AppState {
        character_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("binding listen address")?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}

/// Subscribes to the event bus and traces every domain event.
fn spawn_audit_logger(event_bus: EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "audit logger lagged behind the event bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Emits one structured audit line for a ledger event.
fn log_event(event: &LedgerEvent) {
    match event.character_id() {
        Some(character_id) => {
            tracing::info!(
                event = event.event_type_str(),
                %character_id,
                "ledger event"
            );
        }
        None => {
            tracing::info!(event = event.event_type_str(), "ledger event");
        }
    }
}
