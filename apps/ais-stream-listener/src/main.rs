//! AIS Stream Listener Binary
//!
//! Connects to the AIS live feed and prints one line per vessel position.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin ais-stream-listener
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `AISSTREAM_API_KEY`: AIS stream access key
//!
//! ## Optional
//! - `AISSTREAM_URL`: Stream endpoint (default: wss://stream.aisstream.io/v0/stream)
//! - `AISSTREAM_BOUNDING_BOXES`: JSON `[[[lon, lat], [lon, lat]], ...]` (default: whole globe)
//! - `AISSTREAM_MESSAGE_TYPE`: Tag of interest (default: PositionReport)
//! - `AISSTREAM_FILTER_MESSAGE_TYPES`: Ask the server to filter by tag (default: false)
//! - `LISTENER_RUN_SECS`: Stop after this many seconds (default: run until signalled)
//! - `LISTENER_EVENT_BUFFER`: Event channel capacity (default: 1024)
//! - `LISTENER_HEALTH_PORT`: Health check HTTP port (default: 8083)
//! - `COORDINATES_PATH`: JSON coordinate file served at `/coordinates`
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: ais-stream-listener)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use ais_stream_listener::application::ports::CoordinateSource;
use ais_stream_listener::application::services::ListenerStatus;
use ais_stream_listener::domain::geo::Coordinate;
use ais_stream_listener::domain::listener::ListenerState;
use ais_stream_listener::infrastructure::aisstream::{AisStreamClient, FeedEvent};
use ais_stream_listener::infrastructure::coordinates::JsonFileCoordinateSource;
use ais_stream_listener::infrastructure::display::StdoutDisplay;
use ais_stream_listener::infrastructure::health::{HealthServer, HealthServerState};
use ais_stream_listener::infrastructure::{metrics, telemetry};
use ais_stream_listener::{ListenerConfig, init_metrics};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting AIS Stream Listener");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    let config = ListenerConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let coordinates = load_coordinates(&config).await;

    // Shared listener status for the health server
    let status = Arc::new(ListenerStatus::new());
    metrics::set_connection_state(ListenerState::Connecting);

    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        Arc::clone(&status),
        coordinates,
    ));
    let health_server =
        HealthServer::new(config.health_port, health_state, shutdown_token.clone());

    let (event_tx, event_rx) = mpsc::channel::<FeedEvent>(config.event_buffer);

    let client = AisStreamClient::new(
        config.client_config(),
        Arc::new(StdoutDisplay::new()),
        event_tx,
        shutdown_token.child_token(),
    );

    // Spawn feed event handler
    let handler_status = Arc::clone(&status);
    let events = tokio::spawn(async move {
        handle_feed_events(event_rx, handler_status).await;
    });

    // Spawn health server
    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    // Spawn the feed client; it owns the only event sender
    let mut listener = tokio::spawn(async move {
        if let Err(e) = client.run().await {
            tracing::error!(error = %e, "AIS stream client error");
        }
    });

    tracing::info!("AIS stream listener ready");

    let listener_finished = tokio::select! {
        () = await_shutdown_signal() => false,
        _ = &mut listener => true,
    };

    shutdown_token.cancel();
    if listener_finished {
        tracing::info!("AIS stream connection finished");
    } else {
        let _ = listener.await;
    }

    let _ = events.await;

    tracing::info!(
        lines_rendered = status.snapshot().lines_rendered,
        "AIS stream listener stopped"
    );
    Ok(())
}

/// Apply feed events to the shared status and metrics.
async fn handle_feed_events(mut rx: mpsc::Receiver<FeedEvent>, status: Arc<ListenerStatus>) {
    while let Some(event) = rx.recv().await {
        match event {
            FeedEvent::Connected => {
                status.set_state(ListenerState::Open);
                metrics::set_connection_state(ListenerState::Open);
                tracing::info!("AIS feed connected");
            }
            FeedEvent::Subscribed { bounding_boxes } => {
                tracing::info!(bounding_boxes, "AIS feed subscription sent");
            }
            FeedEvent::Position(report) => {
                status.record_rendered(report.received_at);
                metrics::record_message_received();
                metrics::record_line_rendered();
            }
            FeedEvent::Ignored { .. } => {
                status.record_ignored();
                metrics::record_message_received();
                metrics::record_ignored();
            }
            FeedEvent::Discarded(reason) => {
                status.record_discarded();
                metrics::record_message_received();
                metrics::record_discarded(&reason);
            }
            FeedEvent::FeedError(msg) => {
                status.record_feed_error(msg.clone());
                metrics::record_message_received();
                metrics::record_feed_error();
                tracing::error!(error = %msg, "AIS feed error");
            }
            FeedEvent::Closed(reason) => {
                status.set_state(ListenerState::Closed);
                metrics::set_connection_state(ListenerState::Closed);
                if reason.is_local() {
                    tracing::info!(reason = %reason, "AIS feed closed");
                } else {
                    status.set_error(reason.to_string());
                    tracing::warn!(reason = %reason, "AIS feed closed");
                }
            }
        }
    }
}

/// Load the map coordinates, if a file is configured.
async fn load_coordinates(config: &ListenerConfig) -> Vec<Coordinate> {
    let Some(path) = &config.coordinates_path else {
        return Vec::new();
    };

    let source = JsonFileCoordinateSource::new(path);
    match source.fetch_coordinates().await {
        Ok(coordinates) => {
            tracing::info!(count = coordinates.len(), "Coordinates loaded");
            coordinates
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load coordinates");
            Vec::new()
        }
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration.
fn log_config(config: &ListenerConfig) {
    tracing::info!(
        endpoint = %config.endpoint,
        message_type = %config.message_type,
        bounding_boxes = config.bounding_boxes.len(),
        filter_message_types = config.filter_message_types,
        run_for_secs = config.run_for.map(|d| d.as_secs()),
        health_port = config.health_port,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
