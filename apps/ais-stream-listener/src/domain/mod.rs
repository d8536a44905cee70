//! Domain Layer - Core listener types.
//!
//! Coordinates, position reports, rendered lines and the listener
//! lifecycle. No I/O happens here.

/// Coordinates and bounding boxes.
pub mod geo;

/// Lifecycle states, message outcomes and close reasons.
pub mod listener;

/// Position reports and rendered lines.
pub mod position;
