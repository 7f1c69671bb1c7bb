//! Synthetic storm imagery for tests and benchmarks.
//!
//! Grids are laid out like satellite imagery: row 0 is the northern edge
//! and columns increase eastward. The storm center sits at pixel
//! `(numx / 2, numy / 2)`.

use adt_common::StormGrid;

/// Default grid dimension used by the scenario generators.
pub const STORM_GRID_SIZE: usize = 101;

/// Default pixel spacing in degrees (about 4.4 km).
pub const STORM_GRID_SPACING: f64 = 0.04;

/// Default storm center latitude.
pub const STORM_CENTER_LAT: f64 = 15.0;

/// Default storm center longitude.
pub const STORM_CENTER_LON: f64 = -60.0;

/// Creates a storm grid whose temperature is a function of pixel position.
///
/// # Arguments
///
/// * `size` - Number of rows and columns
/// * `spacing` - Pixel spacing in degrees
/// * `center` - `(lat, lon)` of the center pixel
/// * `temp_at` - Maps `(lat, lon, distance_km, bearing_deg)` of a pixel,
///   measured from the center, to a temperature in Kelvin
///
/// # Returns
///
/// A square `StormGrid`.
pub fn create_storm_grid<F>(size: usize, spacing: f64, center: (f64, f64), temp_at: F) -> StormGrid
where
    F: Fn(f64, f64, f64, f64) -> f32,
{
    let half = (size / 2) as f64;
    let mut lat = Vec::with_capacity(size * size);
    let mut lon = Vec::with_capacity(size * size);
    let mut temp = Vec::with_capacity(size * size);

    for row in 0..size {
        for col in 0..size {
            let plat = center.0 + (half - row as f64) * spacing;
            let plon = center.1 + (col as f64 - half) * spacing;
            let gc = geodesy::distance(center.0, center.1, plat, plon);
            lat.push(plat as f32);
            lon.push(plon as f32);
            temp.push(temp_at(plat, plon, gc.distance, gc.bearing_deg));
        }
    }

    StormGrid::new(size, size, lat, lon, temp).expect("generator dimensions are consistent")
}

/// Creates a grid with a radially symmetric temperature profile.
///
/// # Arguments
///
/// * `profile` - Maps distance from the center (km) to temperature (K)
pub fn create_radial_storm_grid<F>(profile: F) -> StormGrid
where
    F: Fn(f64) -> f32,
{
    create_storm_grid(
        STORM_GRID_SIZE,
        STORM_GRID_SPACING,
        (STORM_CENTER_LAT, STORM_CENTER_LON),
        |_, _, dist, _| profile(dist),
    )
}

/// Creates a grid with the same temperature everywhere.
pub fn create_uniform_storm_grid(temp_k: f32) -> StormGrid {
    create_radial_storm_grid(|_| temp_k)
}

/// Creates a classic eye scene.
///
/// A 30 km warm eye (290 K) is surrounded by a cold eyewall (200 K)
/// extending to 100 km, with a 295 K background beyond.
pub fn create_eye_storm_grid() -> StormGrid {
    create_radial_storm_grid(|dist| {
        if dist <= 30.0 {
            290.0
        } else if dist <= 100.0 {
            200.0
        } else {
            295.0
        }
    })
}

/// Creates a solid cold overcast with no warm eye.
pub fn create_cdo_storm_grid(cloud_temp_k: f32, radius_km: f64) -> StormGrid {
    create_radial_storm_grid(|dist| if dist <= radius_km { cloud_temp_k } else { 295.0 })
}

/// Points along a northern-hemisphere logarithmic spiral arm.
///
/// The arm follows `r = 25 * exp(0.1745 * theta)` and winds toward lower
/// bearings as it moves outward, starting at `bearing_offset`.
pub fn spiral_arm_points(
    center: (f64, f64),
    bearing_offset: f64,
    theta_end_deg: f64,
) -> Vec<(f64, f64)> {
    let growth = 10.0 / 57.29578;
    let mut points = Vec::new();
    let mut theta = 0.0;
    while theta <= theta_end_deg {
        let r = 25.0 * (growth * theta.to_radians()).exp();
        let bearing = bearing_offset - theta;
        points.push(geodesy::destination(center.0, center.1, r, bearing));
        theta += 1.0;
    }
    points
}

/// Creates a warm scene crossed by a single cold spiral band.
///
/// # Arguments
///
/// * `band_temp_k` - Temperature inside the band
/// * `half_width_km` - Half width of the band
/// * `theta_end_deg` - How far along the spiral the band extends
pub fn create_spiral_band_grid(band_temp_k: f32, half_width_km: f64, theta_end_deg: f64) -> StormGrid {
    let center = (STORM_CENTER_LAT, STORM_CENTER_LON);
    let arm = spiral_arm_points(center, 0.0, theta_end_deg);

    create_storm_grid(STORM_GRID_SIZE, STORM_GRID_SPACING, center, |lat, lon, _, _| {
        let on_band = arm
            .iter()
            .any(|&(alat, alon)| geodesy::distance(lat, lon, alat, alon).distance <= half_width_km);
        if on_band {
            band_temp_k
        } else {
            295.0
        }
    })
}
