//! Geographic primitives
//!
//! Coordinates are WGS-84 degrees. Zones are circles on a spherical Earth
//! model; nothing here knows about projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldArcError, Result};

/// A coordinate pair in degrees, used for both zone centers and live positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point without validation
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both coordinates are finite and inside WGS-84 bounds
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A circular geofence marking an area where work is expected to occur
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkZone {
    pub id: String,
    pub name: String,
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl WorkZone {
    /// Create a zone without validation
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, center: GeoPoint, radius_m: f64) -> Self {
        Self { id: id.into(), name: name.into(), center, radius_m }
    }

    /// Validate zone invariants
    ///
    /// # Errors
    /// Returns `FieldArcError::InvalidInput` when the center is outside
    /// WGS-84 bounds or the radius is negative or non-finite.
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(FieldArcError::InvalidInput(format!(
                "zone {} has an invalid center ({}, {})",
                self.id, self.center.latitude, self.center.longitude
            )));
        }
        if !self.radius_m.is_finite() || self.radius_m < 0.0 {
            return Err(FieldArcError::InvalidInput(format!(
                "zone {} has an invalid radius: {}",
                self.id, self.radius_m
            )));
        }
        Ok(())
    }
}

/// One reading from the position feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSample {
    pub point: GeoPoint,
    pub accuracy_m: f64,
    pub observed_at: DateTime<Utc>,
}

impl PositionSample {
    /// Create a sample observed now
    #[must_use]
    pub fn new(point: GeoPoint, accuracy_m: f64) -> Self {
        Self { point, accuracy_m, observed_at: Utc::now() }
    }

    /// Create a sample with an explicit observation time
    #[must_use]
    pub const fn observed(point: GeoPoint, accuracy_m: f64, observed_at: DateTime<Utc>) -> Self {
        Self { point, accuracy_m, observed_at }
    }
}
