//! Geofence evaluation against the work-zone registry
//!
//! The registry is read-only for the lifetime of the evaluator and shared
//! between all worker state machines without locking.

use std::sync::Arc;

use fieldarc_domain::{GeoPoint, WorkZone};

use crate::geo::distance_meters;

/// Evaluates positions against a shared, read-only set of circular zones
#[derive(Debug, Clone)]
pub struct GeofenceEvaluator {
    zones: Arc<[WorkZone]>,
}

impl GeofenceEvaluator {
    /// Create an evaluator over the given zone registry
    #[must_use]
    pub fn new(zones: Vec<WorkZone>) -> Self {
        Self { zones: zones.into() }
    }

    /// The zones this evaluator consults
    #[must_use]
    pub fn zones(&self) -> &[WorkZone] {
        &self.zones
    }

    /// Distance in meters from `point` to the nearest zone boundary
    ///
    /// Zero when the point lies inside any zone; `f64::INFINITY` when the
    /// registry is empty.
    #[must_use]
    pub fn distance_to_nearest_zone(&self, point: &GeoPoint) -> f64 {
        self.zones
            .iter()
            .map(|zone| (distance_meters(point, &zone.center) - zone.radius_m).max(0.0))
            .fold(f64::INFINITY, f64::min)
    }
}
