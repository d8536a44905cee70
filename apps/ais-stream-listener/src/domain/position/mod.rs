//! Vessel Position Types
//!
//! Codec-agnostic representation of a position report and the text line
//! rendered for it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::{GeoError, check_latitude, check_longitude};

// =============================================================================
// Vessel Identifier
// =============================================================================

/// Vessel identifier as defined by the feed (usually an MMSI number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VesselId {
    /// Numeric identifier.
    Numeric(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for VesselId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for VesselId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

// =============================================================================
// Position Report
// =============================================================================

/// A vessel's identifier and current coordinates.
///
/// Ephemeral: consumed once, rendered, not retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    /// Vessel identifier.
    pub vessel_id: VesselId,
    /// Latitude in degrees, within [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, within [-180, 180].
    pub longitude: f64,
    /// Time the report was received by this listener.
    pub received_at: DateTime<Utc>,
}

impl PositionReport {
    /// Create a validated position report stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if latitude or longitude is out of range.
    pub fn new(vessel_id: VesselId, latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        Ok(Self {
            vessel_id,
            latitude: check_latitude(latitude)?,
            longitude: check_longitude(longitude)?,
            received_at: Utc::now(),
        })
    }

    /// Render this report as a display line.
    #[must_use]
    pub fn render(&self) -> RenderedLine {
        RenderedLine::from(self)
    }
}

// =============================================================================
// Rendered Line
// =============================================================================

/// One line of text appended to the display surface per accepted report.
///
/// Format: `ShipId: <id> Latitude: <lat> Longitude: <lon>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RenderedLine(String);

impl RenderedLine {
    /// Borrow the line text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&PositionReport> for RenderedLine {
    fn from(report: &PositionReport) -> Self {
        Self(format!(
            "ShipId: {} Latitude: {} Longitude: {}",
            report.vessel_id, report.latitude, report.longitude
        ))
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
