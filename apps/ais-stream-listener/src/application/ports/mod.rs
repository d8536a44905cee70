//! Port Interfaces
//!
//! Contracts that infrastructure adapters implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - `DisplaySurface`: where rendered position lines are appended
//! - `CoordinateSource`: one-shot loader for map coordinates

use async_trait::async_trait;

use crate::domain::geo::{Coordinate, GeoError};
use crate::domain::position::RenderedLine;

// =============================================================================
// Display Surface
// =============================================================================

/// A sink that accepts rendered lines.
///
/// Appending is the only required capability. Lines are never removed.
#[cfg_attr(test, mockall::automock)]
pub trait DisplaySurface: Send + Sync {
    /// Append one line.
    fn append_line(&self, line: &RenderedLine);
}

// =============================================================================
// Coordinate Source
// =============================================================================

/// Errors from loading coordinates.
#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    /// Underlying source could not be read.
    #[error("failed to read coordinates: {0}")]
    Io(#[from] std::io::Error),

    /// Source content could not be parsed.
    #[error("failed to parse coordinates: {0}")]
    Parse(#[from] serde_json::Error),

    /// A row held an out-of-range value.
    #[error("invalid coordinate at row {index}: {source}")]
    InvalidRow {
        /// Zero-based row index.
        index: usize,
        /// Validation failure.
        #[source]
        source: GeoError,
    },
}

/// Supplies the list of `{latitude, longitude}` pairs shown on the map.
#[async_trait]
pub trait CoordinateSource: Send + Sync {
    /// Fetch the current list of coordinates.
    async fn fetch_coordinates(&self) -> Result<Vec<Coordinate>, CoordinateError>;
}
