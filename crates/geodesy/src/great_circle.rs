//! Great-circle distance and bearing.
//!
//! Distances use the chord form of the great-circle formula, which is
//! numerically well behaved for the short ranges found in storm imagery:
//!
//! ```text
//! c = |P1 - P2|            (unit vectors)
//! d = 2 * asin(c / 2) * R
//! ```
//!
//! Bearings are initial bearings from the first point toward the second,
//! measured clockwise from north in `[0, 360)`.

use crate::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distance and initial bearing between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreatCircle {
    /// Distance in the requested unit
    pub distance: f64,
    /// Initial bearing in degrees clockwise from north, `[0, 360)`
    pub bearing_deg: f64,
}

/// Unit for reported distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    StatuteMiles,
    NauticalMiles,
}

impl DistanceUnit {
    /// Convert a distance in kilometers to this unit.
    pub fn from_km(&self, km: f64) -> f64 {
        match self {
            Self::Kilometers => km,
            Self::StatuteMiles => km * 69.0 / 111.0,
            Self::NauticalMiles => km * 60.0 / 111.0,
        }
    }
}

/// Great-circle distance (km) and bearing from `(lat1, lon1)` to `(lat2, lon2)`.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> GreatCircle {
    distance_in(lat1, lon1, lat2, lon2, DistanceUnit::Kilometers)
}

/// Great-circle distance in `unit` and bearing between two points.
pub fn distance_in(lat1: f64, lon1: f64, lat2: f64, lon2: f64, unit: DistanceUnit) -> GreatCircle {
    let to_rad = PI / 180.0;
    let (phi1, lam1) = (lat1 * to_rad, lon1 * to_rad);
    let (phi2, lam2) = (lat2 * to_rad, lon2 * to_rad);

    let (x1, y1, z1) = unit_vector(phi1, lam1);
    let (x2, y2, z2) = unit_vector(phi2, lam2);
    let chord = ((x1 - x2).powi(2) + (y1 - y2).powi(2) + (z1 - z2).powi(2)).sqrt();
    let central_angle = 2.0 * (chord / 2.0).min(1.0).asin();

    let bearing_deg = if chord > 0.0 {
        let dlam = lam2 - lam1;
        let y = dlam.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlam.cos();
        normalize_bearing(y.atan2(x) / to_rad)
    } else {
        0.0
    };

    GreatCircle {
        distance: unit.from_km(central_angle * EARTH_RADIUS_KM),
        bearing_deg,
    }
}

/// Point reached travelling `distance_km` from `(lat, lon)` along `bearing_deg`.
///
/// Returns `(lat, lon)` with longitude normalized to `[-180, 180)`.
pub fn destination(lat: f64, lon: f64, distance_km: f64, bearing_deg: f64) -> (f64, f64) {
    let to_rad = PI / 180.0;
    let phi1 = lat * to_rad;
    let lam1 = lon * to_rad;
    let theta = bearing_deg * to_rad;
    let delta = distance_km / EARTH_RADIUS_KM;

    let sin_phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).clamp(-1.0, 1.0);
    let phi2 = sin_phi2.asin();
    let lam2 = lam1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    (phi2 / to_rad, normalize_longitude(lam2 / to_rad))
}

fn unit_vector(phi: f64, lam: f64) -> (f64, f64, f64) {
    (phi.cos() * lam.cos(), phi.cos() * lam.sin(), phi.sin())
}

fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if b >= 360.0 {
        0.0
    } else {
        b
    }
}

fn normalize_longitude(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Haversine great-circle distance, used as an independent reference.
    fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
        let dp = p2 - p1;
        let dl = (lon2 - lon1).to_radians();
        let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
        2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
    }

    #[test]
    fn test_zero_distance() {
        for &(lat, lon) in &[(0.0, 0.0), (60.0, -45.0), (-33.5, 151.2), (89.9, 10.0)] {
            let gc = distance(lat, lon, lat, lon);
            assert_eq!(gc.distance, 0.0);
            assert_eq!(gc.bearing_deg, 0.0);
        }
    }

    #[test]
    fn test_equator_reference() {
        let gc = distance(0.0, 0.0, 0.0, 1.0);
        assert!((gc.distance - 111.194_926_6).abs() < 1e-3, "got {}", gc.distance);
        assert!((gc.distance - haversine_km(0.0, 0.0, 0.0, 1.0)).abs() < 1e-3);
    }

    #[test]
    fn test_sixty_north_reference() {
        let vectors = [
            (60.0, 0.0, 60.0, 1.0),
            (60.0, 10.0, 61.0, 10.0),
            (60.0, -20.0, 60.5, -19.25),
        ];
        for &(lat1, lon1, lat2, lon2) in &vectors {
            let gc = distance(lat1, lon1, lat2, lon2);
            let reference = haversine_km(lat1, lon1, lat2, lon2);
            assert!(
                (gc.distance - reference).abs() < 1e-3,
                "{:?}: got {}, expected {}",
                (lat1, lon1, lat2, lon2),
                gc.distance,
                reference
            );
        }
    }

    #[test]
    fn test_translation_consistency() {
        // Shifting both points in longitude must not change the distance
        let a = distance(15.0, -60.0, 16.0, -59.0);
        let b = distance(15.0, 120.0, 16.0, 121.0);
        assert!((a.distance - b.distance).abs() < 1e-6);
        assert!((a.bearing_deg - b.bearing_deg).abs() < 1e-6);
    }

    #[test]
    fn test_cardinal_bearings() {
        let north = distance(10.0, 50.0, 10.5, 50.0);
        let east = distance(0.0, 50.0, 0.0, 50.5);
        let south = distance(10.0, 50.0, 9.5, 50.0);
        let west = distance(0.0, 50.0, 0.0, 49.5);

        assert!(north.bearing_deg.abs() < 1e-9, "north: {}", north.bearing_deg);
        assert!((east.bearing_deg - 90.0).abs() < 1e-9);
        assert!((south.bearing_deg - 180.0).abs() < 1e-9);
        assert!((west.bearing_deg - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_range() {
        for i in 0..72 {
            let angle = i as f64 * 5.0;
            let (lat, lon) = destination(20.0, -70.0, 50.0, angle);
            let gc = distance(20.0, -70.0, lat, lon);
            assert!(gc.bearing_deg >= 0.0 && gc.bearing_deg < 360.0);
        }
    }

    #[test]
    fn test_destination_inverts_distance() {
        let (lat, lon) = destination(25.0, -80.0, 120.0, 37.0);
        let gc = distance(25.0, -80.0, lat, lon);
        assert!((gc.distance - 120.0).abs() < 1e-6);
        assert!((gc.bearing_deg - 37.0).abs() < 1e-6);
    }

    #[test]
    fn test_destination_wraps_dateline() {
        let (_, lon) = destination(0.0, 179.9, 50.0, 90.0);
        assert!(lon < -179.0, "longitude should wrap, got {}", lon);
    }

    #[test]
    fn test_units() {
        let km = distance(0.0, 0.0, 0.0, 1.0).distance;
        let mi = distance_in(0.0, 0.0, 0.0, 1.0, DistanceUnit::StatuteMiles).distance;
        let nm = distance_in(0.0, 0.0, 0.0, 1.0, DistanceUnit::NauticalMiles).distance;
        assert!((mi - km * 69.0 / 111.0).abs() < 1e-9);
        assert!((nm - km * 60.0 / 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_does_not_panic() {
        let gc = distance(0.0, 0.0, 0.0, 180.0);
        assert!((gc.distance - PI * EARTH_RADIUS_KM).abs() < 1e-6);
        assert!(gc.bearing_deg.is_finite());
    }
}
