//! Data models for USGS earthquake API responses.
//!
//! The wire structures match the GeoJSON produced by both the summary feeds
//! and the FDSN event query. [`EventRecord`] is the flattened form the rest
//! of the crate works with.

use serde::{Deserialize, Serialize};

use crate::errors::QuakeviewError;

/// Top-level GeoJSON response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection type or any feature is malformed.
    pub fn validate(&self) -> Result<(), QuakeviewError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeviewError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        self.features.iter().try_for_each(Feature::validate)
    }

    /// Flatten every feature into an [`EventRecord`], preserving feed order.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.features.iter().map(EventRecord::from).collect()
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Human-readable title
    pub title: Option<String>,

    /// Number of events in response
    pub count: Option<usize>,
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Validate the event structure.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty id or a coordinate list that is not
    /// `[longitude, latitude, depth]`.
    pub fn validate(&self) -> Result<(), QuakeviewError> {
        if self.id.is_empty() {
            return Err(QuakeviewError::Validation("empty event ID".into()));
        }
        if self.geometry.coordinates.len() != 3 {
            return Err(QuakeviewError::Validation(format!(
                "event {}: expected 3 coordinates, got {}",
                self.id,
                self.geometry.coordinates.len()
            )));
        }
        Ok(())
    }

    /// Get longitude (degrees).
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates.first().copied().unwrap_or(0.0)
    }

    /// Get latitude (degrees).
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates.get(1).copied().unwrap_or(0.0)
    }

    /// Get depth in kilometers, as published (positive down for USGS).
    #[must_use]
    pub fn depth_km(&self) -> f64 {
        self.geometry.coordinates.get(2).copied().unwrap_or(0.0)
    }
}

/// Geographic geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties from USGS API.
///
/// Only the fields the dashboard reads are modelled; the rest are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Event page URL
    pub url: Option<String>,
}

/// One seismic detection, flattened from a [`Feature`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: String,
    pub place: Option<String>,
    /// Magnitude as published; the feed may send `null`.
    pub mag: Option<f64>,
    /// Event time, ms since epoch.
    pub time: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: f64,
    pub url: Option<String>,
}

impl EventRecord {
    /// Magnitude for arithmetic; a missing value reads as 0.0.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.mag.unwrap_or(0.0)
    }
}

impl From<&Feature> for EventRecord {
    fn from(f: &Feature) -> Self {
        Self {
            id: f.id.clone(),
            place: f.properties.place.clone(),
            mag: f.properties.mag,
            time: f.properties.time,
            longitude: f.longitude(),
            latitude: f.latitude(),
            depth_km: f.depth_km(),
            url: f.properties.url.clone(),
        }
    }
}
