#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! AIS Stream Listener - Live Vessel Position Feed
//!
//! Keeps one WebSocket connection to an AIS streaming service, subscribes
//! with a bounding-box filter once the connection opens, and renders every
//! accepted position report as a line on a display surface.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core listener types
//!   - `geo`: Coordinates and bounding boxes
//!   - `position`: Position reports and rendered lines
//!   - `listener`: Lifecycle states, message outcomes, close reasons
//!
//! - **Application**: Port definitions and shared services
//!   - `ports`: Display surface, coordinate source
//!   - `services`: Listener status tracking
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `aisstream`: WebSocket client, session state machine, wire format
//!   - `display`: Stdout and in-memory display surfaces
//!   - `coordinates`: JSON coordinate file loader
//!   - `config`: Configuration loading
//!   - `health`: Health check HTTP endpoint
//!
//! # Data Flow
//!
//! ```text
//!                  subscription
//! AIS stream WS ◄──────────────── AisStreamClient ──► DisplaySurface (lines)
//!               ────────────────►  (FeedSession)  ──► FeedEvent ──► ListenerStatus
//!                   envelopes                                            │
//!                                                                  Health server
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core listener types with no I/O.
pub mod domain;

/// Application layer - Port definitions and shared services.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::geo::{BoundingBox, Coordinate, Corner, GeoError};
pub use domain::listener::{CloseReason, DiscardReason, ListenerState, MessageOutcome};
pub use domain::position::{PositionReport, RenderedLine, VesselId};

// Ports and services
pub use application::ports::{CoordinateError, CoordinateSource, DisplaySurface};
pub use application::services::{ListenerSnapshot, ListenerStatus};

// AIS stream client (for integration tests)
pub use infrastructure::aisstream::{
    AisStreamClient, AisStreamClientConfig, ApiKey, ClientError, FeedEvent, FeedSession,
    SubscriptionRequest,
};

// Adapters
pub use infrastructure::coordinates::JsonFileCoordinateSource;
pub use infrastructure::display::{MemoryDisplay, StdoutDisplay};

// Infrastructure config
pub use infrastructure::config::{ConfigError, ListenerConfig};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
