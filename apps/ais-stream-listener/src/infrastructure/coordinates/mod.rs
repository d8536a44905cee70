//! Coordinate File Adapter
//!
//! Loads the map coordinates from a JSON document:
//!
//! ```json
//! [{"Latitude": 59.3, "Longitude": 18.1}, {"Latitude": 57.7, "Longitude": 11.9}]
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::ports::{CoordinateError, CoordinateSource};
use crate::domain::geo::Coordinate;

/// Reads coordinates from a JSON file on each fetch.
#[derive(Debug, Clone)]
pub struct JsonFileCoordinateSource {
    path: PathBuf,
}

impl JsonFileCoordinateSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CoordinateSource for JsonFileCoordinateSource {
    async fn fetch_coordinates(&self) -> Result<Vec<Coordinate>, CoordinateError> {
        let raw = tokio::fs::read(&self.path).await?;
        let rows: Vec<Coordinate> = serde_json::from_slice(&raw)?;

        let coordinates = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                row.validate()
                    .map_err(|source| CoordinateError::InvalidRow { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            path = %self.path.display(),
            count = coordinates.len(),
            "Coordinates loaded"
        );
        Ok(coordinates)
    }
}
