//! Radius of maximum wind from the eyewall temperature gradient.

use adt_common::{celsius_to_kelvin, StormGrid};
use serde::{Deserialize, Serialize};

/// Value reported when no eyewall crossing is found.
pub const RMW_MISSING: f32 = -99.9;

/// Default eyewall crossing temperature (K).
const CRITICAL_TEMP_K: f32 = 228.0;

/// Cloud temperatures at or above this raise the crossing temperature (K).
const WARM_CLOUD_TEMP_K: f32 = 223.0;

/// Horizontal search half width (pixels).
const SEARCH_HALF_WIDTH_X: isize = 320;

/// Vertical search half height (pixels).
const SEARCH_HALF_HEIGHT_Y: isize = 240;

/// Center refinement passes.
const ITERATIONS: usize = 5;

/// Linear fit from mean eye radius to RMW.
const RMW_INTERCEPT_KM: f32 = 2.8068;
const RMW_SLOPE: f32 = 0.8361;

/// RMW and eye size estimate, or the missing sentinel in both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RmwEstimate {
    pub rmw_km: f32,
    pub eye_size_km: f32,
}

impl RmwEstimate {
    pub const MISSING: Self = Self {
        rmw_km: RMW_MISSING,
        eye_size_km: RMW_MISSING,
    };

    pub fn is_available(&self) -> bool {
        self.rmw_km > 0.0
    }
}

/// Eyewall crossing temperature for the given eye and cloud temperatures (C).
pub fn crossing_threshold_k(eye_temp_c: f32, cloud_temp_c: f32) -> f32 {
    if celsius_to_kelvin(cloud_temp_c) >= WARM_CLOUD_TEMP_K {
        celsius_to_kelvin((eye_temp_c + 2.0 * cloud_temp_c) / 3.0)
    } else {
        CRITICAL_TEMP_K
    }
}

/// Step from `start` by `step` until the temperature drops to the
/// threshold. `None` when the window edge is reached first.
fn walk<F>(start: isize, step: isize, lo: isize, hi: isize, threshold_k: f32, temp_at: F) -> Option<isize>
where
    F: Fn(isize) -> f32,
{
    let mut pos = start;
    while temp_at(pos) > threshold_k {
        pos += step;
        if pos <= lo || pos >= hi {
            return None;
        }
    }
    Some(pos)
}

/// Estimate RMW by walking outward from the center to the eyewall.
///
/// The walk is repeated with the center moved to the midpoint of the
/// crossings. A walk that reaches the search window edge yields
/// [`RmwEstimate::MISSING`].
pub fn estimate_rmw(grid: &StormGrid, eye_temp_c: f32, cloud_temp_c: f32) -> RmwEstimate {
    let threshold_k = crossing_threshold_k(eye_temp_c, cloud_temp_c);

    let (cx0, cy0) = grid.center_index();
    let (mut cx, mut cy) = (cx0 as isize, cy0 as isize);
    let numx = grid.numx() as isize;
    let numy = grid.numy() as isize;

    let x_lo = (cx - SEARCH_HALF_WIDTH_X).max(0);
    let x_hi = (cx + SEARCH_HALF_WIDTH_X).min(numx);
    let y_lo = (cy - SEARCH_HALF_HEIGHT_Y).max(0);
    let y_hi = (cy + SEARCH_HALF_HEIGHT_Y).min(numy);

    let temp = |x: isize, y: isize| grid.temp(x as usize, y as usize);

    let mut crossings = (0, 0, 0, 0);
    for _ in 0..ITERATIONS {
        let row = cy;
        let col = cx;
        let found = walk(cx, -1, x_lo, x_hi, threshold_k, |x| temp(x, row)).and_then(|x_min| {
            let x_max = walk(cx, 1, x_lo, x_hi, threshold_k, |x| temp(x, row))?;
            let y_min = walk(cy, -1, y_lo, y_hi, threshold_k, |y| temp(col, y))?;
            let y_max = walk(cy, 1, y_lo, y_hi, threshold_k, |y| temp(col, y))?;
            Some((x_min, x_max, y_min, y_max))
        });

        match found {
            Some(c) => crossings = c,
            None => {
                tracing::debug!(threshold_k, cx, cy, "Eyewall not found inside search window");
                return RmwEstimate::MISSING;
            }
        }

        cx = (crossings.0 + crossings.1) / 2;
        cy = (crossings.2 + crossings.3) / 2;
    }

    let (x_min, x_max, y_min, y_max) = crossings;
    let (clat, clon) = (grid.lat(cx as usize, cy as usize), grid.lon(cx as usize, cy as usize));
    let dist_to = |x: isize, y: isize| {
        geodesy::distance(
            grid.lat(x as usize, y as usize) as f64,
            grid.lon(x as usize, y as usize) as f64,
            clat as f64,
            clon as f64,
        )
        .distance as f32
    };

    let avg = (dist_to(x_min, cy) + dist_to(x_max, cy) + dist_to(cx, y_min) + dist_to(cx, y_max)) / 4.0;

    if avg > 0.0 {
        let estimate = RmwEstimate {
            rmw_km: RMW_INTERCEPT_KM + RMW_SLOPE * avg,
            eye_size_km: avg,
        };
        tracing::debug!(rmw_km = estimate.rmw_km, eye_size_km = avg, "Estimated RMW");
        estimate
    } else {
        RmwEstimate::MISSING
    }
}
