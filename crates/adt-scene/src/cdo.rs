//! CDO size, eye size and shear distance measurements.

use adt_common::{Calibration, StormGrid};
use serde::{Deserialize, Serialize};

/// Returned by shear distance when no pixel reaches the threshold (km).
pub const SHEAR_MISSING_KM: f32 = 999.9;

/// Quadrant centers (degrees).
const QUADRANTS_DEG: [f32; 4] = [45.0, 135.0, 225.0, 315.0];

/// Half width of each quadrant arc (degrees).
const QUADRANT_HALF_WIDTH_DEG: f32 = 15.0;

/// Pixels closer than this are ignored when sizing (km).
const MANUAL_EYE_RADIUS_KM: f32 = 24.0;

/// Starting quadrant radius before any pixel is seen (km).
const INITIAL_RADIUS_KM: f32 = 300.0;

/// Quadrants required for a size measurement.
const MIN_VALID_QUADRANTS: usize = 3;

/// Which pixels bound the measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CdoMode {
    /// Radius of the cold overcast, bounded by pixels warmer than the threshold
    CdoSize,
    /// Radius of the warm eye, bounded by pixels at or below the threshold
    EyeSize,
    /// Distance to the nearest pixel at or below the threshold
    ShearDistance,
}

/// Result of a quadrant or shear measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdoSize {
    /// Mean quadrant radius, 0 when unmeasurable. Shear distance in
    /// `ShearDistance` mode.
    pub size_km: f32,
    /// Larger over smaller of the opposite quadrant pair sums
    pub asymmetry: f32,
    pub valid_quadrants: usize,
}

impl CdoSize {
    fn unmeasured() -> Self {
        Self {
            size_km: 0.0,
            asymmetry: 0.0,
            valid_quadrants: 0,
        }
    }
}

/// Measure a CDO or eye radius, or a shear distance, around `center`.
pub fn measure(
    grid: &StormGrid,
    center: (f32, f32),
    threshold_k: f32,
    mode: CdoMode,
    calibration: &Calibration,
) -> CdoSize {
    match mode {
        CdoMode::CdoSize => quadrant_size(grid, center, calibration, |t| t > threshold_k),
        CdoMode::EyeSize => quadrant_size(grid, center, calibration, |t| t <= threshold_k),
        CdoMode::ShearDistance => CdoSize {
            size_km: shear_distance(grid, center, threshold_k),
            asymmetry: 0.0,
            valid_quadrants: 0,
        },
    }
}

/// Distance to the nearest pixel at or below `threshold_k`.
pub fn shear_distance(grid: &StormGrid, center: (f32, f32), threshold_k: f32) -> f32 {
    let nearest = grid
        .pixels()
        .filter(|&(_, _, t)| t <= threshold_k)
        .map(|(lat, lon, _)| {
            geodesy::distance(center.0 as f64, center.1 as f64, lat as f64, lon as f64).distance
                as f32
        })
        .fold(f32::INFINITY, f32::min);

    if nearest.is_finite() {
        nearest
    } else {
        tracing::debug!(threshold_k, "No pixel at shear threshold");
        SHEAR_MISSING_KM
    }
}

fn quadrant_size<F>(
    grid: &StormGrid,
    center: (f32, f32),
    calibration: &Calibration,
    bounds: F,
) -> CdoSize
where
    F: Fn(f32) -> bool,
{
    let mut radii = [INITIAL_RADIUS_KM; 4];
    let mut max_dist = 0.0f32;
    let mut selected = 0usize;

    for (lat, lon, temp) in grid.pixels() {
        if !bounds(temp) {
            continue;
        }
        selected += 1;

        let gc = geodesy::distance(center.0 as f64, center.1 as f64, lat as f64, lon as f64);
        let dist = gc.distance as f32;
        let bearing = gc.bearing_deg as f32;
        max_dist = max_dist.max(dist);

        if dist <= MANUAL_EYE_RADIUS_KM {
            continue;
        }
        for (radius, q) in radii.iter_mut().zip(QUADRANTS_DEG) {
            if (bearing - q).abs() <= QUADRANT_HALF_WIDTH_DEG && dist < *radius {
                *radius = dist;
            }
        }
    }

    // Every pixel bounds the region: nothing to measure
    if selected == grid.len() {
        return CdoSize::unmeasured();
    }

    let min_valid = MANUAL_EYE_RADIUS_KM + calibration.ring_width_km;
    let valid_quadrants = radii.iter().filter(|&&r| r >= min_valid).count();
    if valid_quadrants < MIN_VALID_QUADRANTS {
        return CdoSize {
            valid_quadrants,
            ..CdoSize::unmeasured()
        };
    }

    for r in radii.iter_mut() {
        *r = r.min(max_dist);
    }
    let size_km = radii.iter().sum::<f32>() / 4.0;
    let across = radii[0] + radii[2];
    let along = radii[1] + radii[3];
    let asymmetry = if across > 0.0 && along > 0.0 {
        let v = across / along;
        v.max(1.0 / v)
    } else {
        0.0
    };

    CdoSize {
        size_km,
        asymmetry,
        valid_quadrants,
    }
}
