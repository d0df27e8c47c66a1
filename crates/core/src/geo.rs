//! Great-circle distance math
//!
//! Haversine distance on a spherical Earth model. Coordinate validity is
//! enforced where points enter the system (zone registry construction, config
//! loading), so the math itself stays a pure fold over finite floats.

use fieldarc_domain::constants::EARTH_RADIUS_METERS;
use fieldarc_domain::GeoPoint;

/// Great-circle distance between two points in meters
#[must_use]
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair past 1.0 for near-antipodal pairs; clamp
    // to keep asin in its domain
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}
