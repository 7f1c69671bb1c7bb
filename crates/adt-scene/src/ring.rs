//! Ring sampling around the storm center.

use adt_common::{Calibration, StormGrid};
use serde::{Deserialize, Serialize};

/// One pixel expressed relative to the storm center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSample {
    pub distance_km: f32,
    /// Bearing from the center, clockwise from north, `[0, 360)`
    pub bearing_deg: f32,
    pub temp_k: f32,
}

/// Flatten the grid into samples within `ring_end_km + 80` of the center.
///
/// The extra margin gives the warm-ring annulus support beyond the outer
/// cloud-top ring.
pub fn sample_rings(grid: &StormGrid, calibration: &Calibration) -> Vec<RingSample> {
    let (clat, clon) = grid.center();
    let max_dist = calibration.sample_radius_km();

    let samples: Vec<RingSample> = grid
        .pixels()
        .filter_map(|(lat, lon, temp_k)| {
            let gc = geodesy::distance(clat as f64, clon as f64, lat as f64, lon as f64);
            let distance_km = gc.distance as f32;
            if distance_km > max_dist {
                return None;
            }

            let mut bearing_deg = gc.bearing_deg as f32;
            if bearing_deg >= 360.0 {
                bearing_deg = 0.0;
            }

            Some(RingSample {
                distance_km,
                bearing_deg,
                temp_k,
            })
        })
        .collect();

    tracing::debug!(
        samples = samples.len(),
        pixels = grid.len(),
        max_dist_km = max_dist,
        "Sampled rings around storm center"
    );

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::create_uniform_storm_grid;

    #[test]
    fn test_samples_within_radius() {
        let grid = create_uniform_storm_grid(280.0);
        let cal = Calibration::default();
        let samples = sample_rings(&grid, &cal);

        assert!(!samples.is_empty());
        assert!(samples.len() < grid.len(), "corners lie beyond the sample radius");
        assert!(samples.iter().all(|s| s.distance_km <= 216.0));
    }

    #[test]
    fn test_bearings_in_range() {
        let grid = create_uniform_storm_grid(280.0);
        let samples = sample_rings(&grid, &Calibration::default());
        for s in &samples {
            assert!(
                s.bearing_deg >= 0.0 && s.bearing_deg < 360.0,
                "bearing out of range: {}",
                s.bearing_deg
            );
        }
    }

    #[test]
    fn test_center_sample_is_zero_distance() {
        let grid = create_uniform_storm_grid(280.0);
        let samples = sample_rings(&grid, &Calibration::default());
        let zero = samples.iter().filter(|s| s.distance_km == 0.0).count();
        assert_eq!(zero, 1);
    }
}
