//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// AIS stream WebSocket client and wire format.
pub mod aisstream;

/// Configuration loading.
pub mod config;

/// Coordinate file adapter.
pub mod coordinates;

/// Display surface adapters.
pub mod display;

/// Health check HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
