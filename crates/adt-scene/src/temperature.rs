//! Eye and cloud-top temperature extraction.

use crate::ring::RingSample;
use adt_common::{kelvin_to_celsius, AdtError, AdtResult, Calibration, EyeTemperatureMode};
use serde::{Deserialize, Serialize};

/// Physically plausible brightness temperature range (C).
pub const VALID_TEMP_RANGE_C: (f32, f32) = (-100.0, 40.0);

/// Ring maxima at or below this temperature are treated as missing data (K).
const MIN_RING_TEMP_K: f32 = 160.0;

/// Inner floor of the warm-ring annulus (km).
const ANNULUS_MIN_INNER_KM: f32 = 28.0;

/// Outer floor of the warm-ring annulus (km).
const ANNULUS_MIN_OUTER_KM: f32 = 108.0;

/// Half width of the warm-ring annulus (km).
const ANNULUS_HALF_WIDTH_KM: f32 = 40.0;

/// Warmest pixel found while searching for the eye temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmestPixel {
    pub temp_c: f32,
    pub distance_km: f32,
    pub bearing_deg: f32,
}

/// Eye temperature and the pixel it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeTemperature {
    /// Temperature used as the eye temperature (C)
    pub temp_c: f32,
    pub warmest: WarmestPixel,
}

/// Coldest of the per-ring warmest temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudTopTemperature {
    pub temp_c: f32,
    /// Inner radius of the ring holding that temperature (km)
    pub ring_km: f32,
}

pub(crate) fn check_range(quantity: &'static str, celsius: f32) -> AdtResult<f32> {
    let (lo, hi) = VALID_TEMP_RANGE_C;
    if celsius.is_nan() || celsius < lo || celsius > hi {
        tracing::warn!(quantity, celsius, "Temperature outside plausible range");
        return Err(AdtError::TemperatureOutOfRange { quantity, celsius });
    }
    Ok(celsius)
}

/// Find the eye temperature.
///
/// The search starts from the center pixel temperature and keeps the
/// warmest sample within the search radius. In `WarmestPixel` mode the
/// wider radius is searched and the eye temperature stays at the center
/// pixel.
pub fn eye_temperature(
    samples: &[RingSample],
    center_temp_k: f32,
    calibration: &Calibration,
) -> AdtResult<EyeTemperature> {
    let radius = match calibration.eye_mode {
        EyeTemperatureMode::Maximum => calibration.eye_search_radius_km,
        EyeTemperatureMode::WarmestPixel => calibration.warmest_pixel_radius_km,
    };

    let mut warm = (center_temp_k, 0.0f32, 0.0f32);
    for s in samples.iter().filter(|s| s.distance_km <= radius) {
        if s.temp_k > warm.0 {
            warm = (s.temp_k, s.distance_km, s.bearing_deg);
        }
    }

    let warmest = WarmestPixel {
        temp_c: check_range("eye", kelvin_to_celsius(warm.0))?,
        distance_km: warm.1,
        bearing_deg: warm.2,
    };

    let temp_c = match calibration.eye_mode {
        EyeTemperatureMode::Maximum => warmest.temp_c,
        EyeTemperatureMode::WarmestPixel => kelvin_to_celsius(center_temp_k),
    };

    Ok(EyeTemperature { temp_c, warmest })
}

/// Find the cloud-top temperature: the coldest of each ring's warmest pixel.
pub fn cloud_top_temperature(
    samples: &[RingSample],
    calibration: &Calibration,
) -> AdtResult<CloudTopTemperature> {
    let start = calibration.ring_start_km;
    let end = calibration.ring_end_km;
    let width = calibration.ring_width_km;
    let rings = calibration.ring_count().max(1);

    let mut ring_max = vec![0.0f32; rings];
    for s in samples {
        if s.distance_km >= start && s.distance_km < end {
            let ring = (((s.distance_km.trunc() - start) / width).max(0.0) as usize).min(rings - 1);
            if s.temp_k > ring_max[ring] {
                ring_max[ring] = s.temp_k;
            }
        }
    }

    let mut coldest = 10000.0f32;
    let mut ring_km = 0.0f32;
    for (i, &t) in ring_max.iter().enumerate() {
        if t < coldest && t > MIN_RING_TEMP_K {
            coldest = t;
            ring_km = i as f32 * width + start;
        }
    }

    let temp_c = check_range("cloud top", kelvin_to_celsius(coldest))?;
    Ok(CloudTopTemperature { temp_c, ring_km })
}

/// Mean temperature (C) of the annulus 40 km either side of `ring_km`.
pub fn warm_ring_mean(samples: &[RingSample], ring_km: f32) -> AdtResult<f32> {
    let inner = ANNULUS_MIN_INNER_KM.max(ring_km - ANNULUS_HALF_WIDTH_KM);
    let outer = ANNULUS_MIN_OUTER_KM.max(ring_km + ANNULUS_HALF_WIDTH_KM);

    let (sum, count) = samples
        .iter()
        .filter(|s| s.distance_km >= inner && s.distance_km <= outer)
        .fold((0.0f64, 0usize), |(sum, n), s| {
            (sum + kelvin_to_celsius(s.temp_k) as f64, n + 1)
        });

    let mean = if count > 0 {
        (sum / count as f64) as f32
    } else {
        f32::NAN
    };
    check_range("cloud annulus", mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(profile: impl Fn(f32) -> f32) -> Vec<RingSample> {
        let mut samples = Vec::new();
        let mut d = 0.0f32;
        while d <= 216.0 {
            for deg in (0..360).step_by(10) {
                samples.push(RingSample {
                    distance_km: d,
                    bearing_deg: deg as f32,
                    temp_k: profile(d),
                });
            }
            d += 2.0;
        }
        samples
    }

    #[test]
    fn test_eye_temperature_takes_warmest() {
        let samples = ring(|d| if d <= 10.0 { 290.0 } else { 200.0 });
        let eye = eye_temperature(&samples, 285.0, &Calibration::default()).unwrap();
        assert!((eye.temp_c - (290.0 - 273.16)).abs() < 1e-4);
        assert_eq!(eye.warmest.distance_km, 0.0);
    }

    #[test]
    fn test_eye_temperature_floor_is_center() {
        let samples = ring(|_| 200.0);
        let eye = eye_temperature(&samples, 250.0, &Calibration::default()).unwrap();
        assert!((eye.temp_c - (250.0 - 273.16)).abs() < 1e-4);
    }

    #[test]
    fn test_warmest_pixel_mode_keeps_center_temperature() {
        let samples = ring(|d| if (50.0..=60.0).contains(&d) { 280.0 } else { 220.0 });
        let cal = Calibration {
            eye_mode: EyeTemperatureMode::WarmestPixel,
            ..Default::default()
        };
        let eye = eye_temperature(&samples, 220.0, &cal).unwrap();
        assert!((eye.temp_c - (220.0 - 273.16)).abs() < 1e-4);
        assert!((eye.warmest.temp_c - (280.0 - 273.16)).abs() < 1e-4);
        assert_eq!(eye.warmest.distance_km, 50.0);
    }

    #[test]
    fn test_eye_temperature_out_of_range() {
        let samples = ring(|_| 330.0);
        let result = eye_temperature(&samples, 330.0, &Calibration::default());
        assert!(matches!(
            result,
            Err(AdtError::TemperatureOutOfRange { quantity: "eye", .. })
        ));
    }

    #[test]
    fn test_cloud_top_finds_coldest_ring() {
        // Warm inside 40 km, cold band 40..100 km, warm beyond
        let samples = ring(|d| {
            if d < 40.0 {
                290.0
            } else if d < 100.0 {
                200.0
            } else {
                295.0
            }
        });
        let top = cloud_top_temperature(&samples, &Calibration::default()).unwrap();
        assert!((top.temp_c - (200.0 - 273.16)).abs() < 1e-4);
        assert_eq!(top.ring_km, 40.0);
    }

    #[test]
    fn test_cloud_top_without_samples_fails() {
        let result = cloud_top_temperature(&[], &Calibration::default());
        assert!(matches!(result, Err(AdtError::TemperatureOutOfRange { .. })));
    }

    #[test]
    fn test_warm_ring_mean_bounds() {
        // Only samples inside the 28..108 km annulus are cold
        let samples = ring(|d| if (28.0..=108.0).contains(&d) { 220.0 } else { 300.0 });
        let mean = warm_ring_mean(&samples, 40.0).unwrap();
        assert!((mean - (220.0 - 273.16)).abs() < 1e-3);
    }

    #[test]
    fn test_warm_ring_mean_moves_with_ring() {
        let samples = ring(|d| if d >= 110.0 { 210.0 } else { 290.0 });
        // Annulus 110..190 km
        let mean = warm_ring_mean(&samples, 150.0).unwrap();
        assert!((mean - (210.0 - 273.16)).abs() < 1e-3);
    }

    #[test]
    fn test_warm_ring_mean_without_samples_fails() {
        let result = warm_ring_mean(&[], 40.0);
        assert!(result.is_err());
    }
}
