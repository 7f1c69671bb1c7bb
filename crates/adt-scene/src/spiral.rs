//! Logarithmic spiral matching for curved band detection.
//!
//! A 10 degree logarithmic spiral `r = 25 * exp(0.1745 * theta)` is laid over
//! the cold pixels of the image at twelve rotations. Each spiral point that
//! has at least four cold pixels close by is a hit; the score of a spiral is
//! its longest run of consecutive hits.

use adt_common::{Calibration, StormGrid};
use serde::{Deserialize, Serialize};

/// Degrees per radian as used by the spiral definition.
const DEGREES_PER_RADIAN: f64 = 57.29578;

/// Spiral radius at theta = 0 (km).
const SPIRAL_START_KM: f64 = 25.0;

/// Last spiral angle examined (degrees).
const SPIRAL_END_DEG: u32 = 540;

/// Spiral angle step (degrees).
const SPIRAL_STEP_DEG: usize = 15;

/// Rotation step around the center (degrees).
const ROTATION_STEP_DEG: usize = 30;

/// Cold pixels a spiral point needs nearby to count as a hit.
const MIN_PIXELS_PER_HIT: usize = 4;

/// Lat/lon half width of the box around a spiral point (degrees).
const HIT_BOX_DEG: f64 = 0.1;

/// Box search half width (hundredths of a degree).
const BOX_HALF_WIDTH: i32 = 100;

/// Box search lattice step (hundredths of a degree).
const BOX_STEP: usize = 20;

/// Box search centers this close to a cold pixel are skipped (km).
const MIN_START_DISTANCE_KM: f64 = 12.0;

/// Where candidate spiral centers are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiralSearch {
    /// Only the given center.
    Point,
    /// A 0.2 degree lattice covering +/- 1 degree around the center.
    Box,
}

/// Best spiral found by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiralMatch {
    /// Longest run of consecutive hits, 0 when nothing matched
    pub consecutive_hits: u32,
    /// Spiral center latitude
    pub lat: f32,
    /// Spiral center longitude
    pub lon: f32,
    pub rotation_deg: f32,
    /// Points of the best spiral as (lat, lon)
    pub arc: Vec<(f32, f32)>,
}

/// Cold pixel locations sorted by latitude.
struct ColdPixels {
    points: Vec<(f64, f64)>,
}

impl ColdPixels {
    fn collect(grid: &StormGrid, threshold_k: f32) -> Self {
        let mut points: Vec<(f64, f64)> = grid
            .pixels()
            .filter(|&(_, _, t)| t <= threshold_k)
            .map(|(lat, lon, _)| (lat as f64, lon as f64))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { points }
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    /// Pixels with latitude in `[lat - tol, lat + tol]`.
    fn lat_band(&self, lat: f64, tol: f64) -> &[(f64, f64)] {
        let start = self.points.partition_point(|p| p.0 < lat - tol);
        let end = self.points.partition_point(|p| p.0 <= lat + tol);
        &self.points[start..end.max(start)]
    }

    /// Count pixels inside the hit box and within `max_km` of the point.
    fn count_near(&self, lat: f64, lon: f64, max_km: f64) -> usize {
        self.lat_band(lat, HIT_BOX_DEG)
            .iter()
            .filter(|&&(plat, plon)| {
                (lon - plon).abs() <= HIT_BOX_DEG
                    && geodesy::distance(lat, lon, plat, plon).distance <= max_km
            })
            .count()
    }

    fn any_within(&self, lat: f64, lon: f64, km: f64) -> bool {
        let tol = km / 111.0 + 0.01;
        self.lat_band(lat, tol)
            .iter()
            .any(|&(plat, plon)| geodesy::distance(lat, lon, plat, plon).distance <= km)
    }
}

/// Position of the spiral point at `theta_deg` for the given rotation.
///
/// Northern hemisphere spirals wind counterclockwise going inward, so the
/// bearing decreases as theta grows; southern spirals are mirrored.
fn spiral_point(lat: f64, lon: f64, rotation_deg: f64, theta_deg: f64) -> (f64, f64) {
    let growth = 10.0 / DEGREES_PER_RADIAN;
    let r = SPIRAL_START_KM * (growth * theta_deg / DEGREES_PER_RADIAN).exp();
    let bearing = if lat < 0.0 {
        rotation_deg + theta_deg
    } else {
        rotation_deg - theta_deg
    };
    geodesy::destination(lat, lon, r, bearing)
}

fn thetas() -> impl Iterator<Item = f64> {
    (0..=SPIRAL_END_DEG).step_by(SPIRAL_STEP_DEG).map(|t| t as f64)
}

/// Longest consecutive hit run of one spiral.
fn score_spiral(cold: &ColdPixels, lat: f64, lon: f64, rotation_deg: f64, max_km: f64) -> u32 {
    let mut run = 0;
    let mut best = 0;
    for theta in thetas() {
        let (plat, plon) = spiral_point(lat, lon, rotation_deg, theta);
        if cold.count_near(plat, plon, max_km) >= MIN_PIXELS_PER_HIT {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

fn to_hundredths(deg: f32) -> i32 {
    (deg as f64 * 100.0) as i32
}

/// Search for the best fitting spiral of pixels at or below `threshold_k`.
pub fn match_spiral(
    grid: &StormGrid,
    center: (f32, f32),
    threshold_k: f32,
    search: SpiralSearch,
    calibration: &Calibration,
) -> SpiralMatch {
    let cold = ColdPixels::collect(grid, threshold_k);
    let max_km = calibration.sensor.effective_resolution_km() as f64;

    let (lat0, lon0) = (to_hundredths(center.0), to_hundredths(center.1));
    let half = match search {
        SpiralSearch::Point => 0,
        SpiralSearch::Box => BOX_HALF_WIDTH,
    };

    let mut best: Option<(u32, f64, f64, f64)> = None;

    for ilat in ((lat0 - half)..=(lat0 + half)).step_by(BOX_STEP) {
        let lat = ilat as f64 / 100.0;
        for ilon in ((lon0 - half)..=(lon0 + half)).step_by(BOX_STEP) {
            let lon = ilon as f64 / 100.0;

            if search == SpiralSearch::Box && cold.any_within(lat, lon, MIN_START_DISTANCE_KM) {
                continue;
            }

            let mut center_best = (0u32, 0.0f64);
            for rotation in (0..360).step_by(ROTATION_STEP_DEG) {
                let rotation = rotation as f64;
                let hits = score_spiral(&cold, lat, lon, rotation, max_km);
                if hits > center_best.0 {
                    center_best = (hits, rotation);
                }
            }

            if best.map_or(true, |b| center_best.0 > b.0) {
                best = Some((center_best.0, lat, lon, center_best.1));
            }
        }
    }

    let (hits, lat, lon, rotation) =
        best.unwrap_or((0, center.0 as f64, center.1 as f64, 0.0));

    let arc = thetas()
        .map(|theta| {
            let (plat, plon) = spiral_point(lat, lon, rotation, theta);
            (plat as f32, plon as f32)
        })
        .collect();

    tracing::debug!(
        threshold_k,
        cold_pixels = cold.len(),
        hits,
        lat,
        lon,
        rotation,
        ?search,
        "Log spiral search complete"
    );

    SpiralMatch {
        consecutive_hits: hits,
        lat: lat as f32,
        lon: lon as f32,
        rotation_deg: rotation as f32,
        arc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{create_spiral_band_grid, create_uniform_storm_grid};

    #[test]
    fn test_spiral_radius_growth() {
        let (lat, lon) = spiral_point(15.0, -60.0, 0.0, 0.0);
        let d = geodesy::distance(15.0, -60.0, lat, lon).distance;
        assert!((d - 25.0).abs() < 1e-6);

        // One full turn multiplies the radius by exp(2*pi*0.1745)
        let (lat, lon) = spiral_point(15.0, -60.0, 0.0, 360.0);
        let d = geodesy::distance(15.0, -60.0, lat, lon).distance;
        assert!((d - 74.8).abs() < 0.5, "{}", d);
    }

    #[test]
    fn test_southern_spiral_is_mirrored() {
        let north = spiral_point(10.0, 0.0, 0.0, 90.0);
        let south = spiral_point(-10.0, 0.0, 0.0, 90.0);
        let gn = geodesy::distance(10.0, 0.0, north.0, north.1);
        let gs = geodesy::distance(-10.0, 0.0, south.0, south.1);
        assert!((gn.bearing_deg - 270.0).abs() < 0.5);
        assert!((gs.bearing_deg - 90.0).abs() < 0.5);
    }

    #[test]
    fn test_no_cold_pixels_gives_zero() {
        let grid = create_uniform_storm_grid(280.0);
        let m = match_spiral(&grid, grid.center(), 220.0, SpiralSearch::Point, &Calibration::default());
        assert_eq!(m.consecutive_hits, 0);
        assert_eq!(m.arc.len(), 37);
    }

    #[test]
    fn test_everything_cold_hits_every_point() {
        let grid = create_uniform_storm_grid(200.0);
        let m = match_spiral(&grid, grid.center(), 220.0, SpiralSearch::Point, &Calibration::default());
        // The outermost points fall off the grid
        assert!(m.consecutive_hits >= 30, "{}", m.consecutive_hits);
        assert_eq!(m.rotation_deg, 0.0);
    }

    #[test]
    fn test_spiral_band_is_matched() {
        let grid = create_spiral_band_grid(210.0, 8.0, 270.0);
        let m = match_spiral(&grid, grid.center(), 219.16, SpiralSearch::Point, &Calibration::default());
        // Band covers theta 0..=270, 19 spiral points at rotation 0.
        // Neighbouring rotations run nearly parallel to the band.
        assert!(m.consecutive_hits >= 19 && m.consecutive_hits <= 22, "{}", m.consecutive_hits);
        assert!((m.lat - 15.0).abs() < 1e-4);
        assert!((m.lon + 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_box_search_skips_cold_centers() {
        let grid = create_uniform_storm_grid(200.0);
        let m = match_spiral(&grid, grid.center(), 220.0, SpiralSearch::Box, &Calibration::default());
        // Every lattice point sits on cold cloud
        assert_eq!(m.consecutive_hits, 0);
        assert!((m.lat - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_box_search_finds_band() {
        let grid = create_spiral_band_grid(210.0, 8.0, 270.0);
        let point = match_spiral(&grid, grid.center(), 219.16, SpiralSearch::Point, &Calibration::default());
        let boxed = match_spiral(&grid, grid.center(), 219.16, SpiralSearch::Box, &Calibration::default());
        assert!(boxed.consecutive_hits >= point.consecutive_hits);
    }
}
