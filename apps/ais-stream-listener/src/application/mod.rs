//! Application Layer - Port definitions and shared services.
//!
//! This layer defines how the listener talks to its collaborators
//! (display surface, coordinate source) and tracks listener status.

/// Port interfaces for external collaborators.
pub mod ports;

/// Listener status tracking.
pub mod services;
