//! Spherical-earth geodesy used by the scene analysis.
//!
//! Implements great-circle distance, bearing and destination-point
//! calculations from scratch on a 6371 km sphere.

pub mod great_circle;

pub use great_circle::{destination, distance, distance_in, DistanceUnit, GreatCircle};

/// Mean earth radius used by the ADT (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;
