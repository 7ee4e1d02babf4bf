//! welfare-ledger server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use welfare_ledger::api;
use welfare_ledger::app_state::AppState;
use welfare_ledger::config::{LogFormat, ServiceConfig};
use welfare_ledger::domain::{EventBus, Ledger};
use welfare_ledger::persistence::PostgresPersistence;
use welfare_ledger::persistence::worker::{spawn_event_logger, spawn_snapshotter};
use welfare_ledger::service::UsdRate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting welfare-ledger");

    // Build domain layer
    let ledger = Arc::new(Ledger::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let rate = UsdRate::new(config.native_usd_rate).context("invalid NATIVE_USD_RATE")?;

    // Persistence
    if config.persistence_enabled {
        let store = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        if let Some(snapshot) = store.load_latest_snapshot().await? {
            let records = snapshot.record_count();
            ledger.restore(snapshot).await;
            tracing::info!(records, "ledger restored from snapshot");
        }
        if config.event_log_enabled {
            spawn_event_logger(store.clone(), &event_bus);
        }
        spawn_snapshotter(
            store,
            Arc::clone(&ledger),
            config.snapshot_interval_secs,
            config.cleanup_after_days,
        );
    } else {
        tracing::warn!("persistence disabled, ledger state lives in memory only");
    }

    // Build application state
    let app_state = AppState::new(
        ledger,
        event_bus,
        rate,
        config.adoption_min_payment_usd,
    );

    // Build router
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
