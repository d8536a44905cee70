//! Geographic Primitives
//!
//! Coordinates and bounding boxes shared by the live feed listener and the
//! coordinate loader. Longitude is in [-180, 180], latitude in [-90, 90].

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

/// Minimum valid latitude in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised when validating geographic values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180] or not finite.
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Validate a latitude value.
///
/// # Errors
///
/// Returns `GeoError::LatitudeOutOfRange` for non-finite or out-of-range values.
pub fn check_latitude(latitude: f64) -> Result<f64, GeoError> {
    if latitude.is_finite() && (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        Ok(latitude)
    } else {
        Err(GeoError::LatitudeOutOfRange(latitude))
    }
}

/// Validate a longitude value.
///
/// # Errors
///
/// Returns `GeoError::LongitudeOutOfRange` for non-finite or out-of-range values.
pub fn check_longitude(longitude: f64) -> Result<f64, GeoError> {
    if longitude.is_finite() && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        Ok(longitude)
    } else {
        Err(GeoError::LongitudeOutOfRange(longitude))
    }
}

// =============================================================================
// Coordinate
// =============================================================================

/// A latitude/longitude pair.
///
/// # Wire Format (JSON)
/// ```json
/// {"Latitude": 55.95, "Longitude": -3.19}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    #[serde(rename = "Latitude")]
    pub latitude: f64,

    /// Longitude in degrees.
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        Ok(Self {
            latitude: check_latitude(latitude)?,
            longitude: check_longitude(longitude)?,
        })
    }

    /// Re-check a coordinate that was deserialized without validation.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is out of range.
    pub fn validate(self) -> Result<Self, GeoError> {
        Self::new(self.latitude, self.longitude)
    }
}

// =============================================================================
// Bounding Box
// =============================================================================

/// One corner of a bounding box, serialized as `[longitude, latitude]`.
///
/// Whole degrees are written as JSON integers, so the globe box goes out as
/// `[[-180,-90],[180,90]]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "[f64; 2]")]
pub struct Corner {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl Corner {
    /// Create a validated corner.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is out of range.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        Ok(Self {
            longitude: check_longitude(longitude)?,
            latitude: check_latitude(latitude)?,
        })
    }
}

impl TryFrom<[f64; 2]> for Corner {
    type Error = GeoError;

    fn try_from([longitude, latitude]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(longitude, latitude)
    }
}

impl Serialize for Corner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&Degrees(self.longitude))?;
        tuple.serialize_element(&Degrees(self.latitude))?;
        tuple.end()
    }
}

/// A validated degree value; always within [-180, 180].
struct Degrees(f64);

impl Serialize for Degrees {
    #[allow(clippy::cast_possible_truncation)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// Rectangular region filter made of two opposite corners.
///
/// Corner order is not enforced; the feed accepts either diagonal.
///
/// # Wire Format (JSON)
/// ```json
/// [[-180, -90], [180, 90]]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Corner; 2]", into = "[Corner; 2]")]
pub struct BoundingBox {
    /// First corner.
    pub first: Corner,
    /// Opposite corner.
    pub second: Corner,
}

impl BoundingBox {
    /// Create a bounding box from two corners.
    #[must_use]
    pub const fn new(first: Corner, second: Corner) -> Self {
        Self { first, second }
    }

    /// Create a bounding box from raw `(longitude, latitude)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any component is out of range.
    pub fn from_degrees(first: (f64, f64), second: (f64, f64)) -> Result<Self, GeoError> {
        Ok(Self {
            first: Corner::new(first.0, first.1)?,
            second: Corner::new(second.0, second.1)?,
        })
    }

    /// The whole globe: `[[-180, -90], [180, 90]]`.
    #[must_use]
    pub const fn globe() -> Self {
        Self {
            first: Corner {
                longitude: MIN_LONGITUDE,
                latitude: MIN_LATITUDE,
            },
            second: Corner {
                longitude: MAX_LONGITUDE,
                latitude: MAX_LATITUDE,
            },
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::globe()
    }
}

impl From<[Corner; 2]> for BoundingBox {
    fn from([first, second]: [Corner; 2]) -> Self {
        Self { first, second }
    }
}

impl From<BoundingBox> for [Corner; 2] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.first, bbox.second]
    }
}

// =============================================================================
// Tests
// =============================================================================
