//! Feature extraction from a storm-centered IR grid.

use crate::ring::{sample_rings, RingSample};
use crate::spectral::{spectral_texture, temperature_histogram, SpectralTexture};
use crate::stats::SectorStats;
use crate::temperature::{cloud_top_temperature, eye_temperature, warm_ring_mean};
use adt_common::{
    kelvin_to_celsius, AdtError, AdtResult, Calibration, EyeTemperatureMode, StormGrid,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Location of the warmest pixel near the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmestSpot {
    pub temp_c: f32,
    pub lat: f32,
    pub lon: f32,
}

/// Everything the classifier needs to know about one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Storm center latitude
    pub lat: f32,
    /// Storm center longitude
    pub lon: f32,
    pub image_time: Option<NaiveDateTime>,
    /// Eye temperature (C)
    pub eye_temp_c: f32,
    /// Present only in warmest-pixel mode
    pub warmest: Option<WarmestSpot>,
    /// Coldest of the per-ring warmest temperatures (C)
    pub cloud_top_temp_c: f32,
    /// Ring distance of the cloud-top temperature (km)
    pub cloud_top_ring_km: f32,
    /// Mean of the warm-ring annulus (C)
    pub cloud_temp_c: f32,
    /// Mean of the 24 sector means (C)
    pub sector_mean_temp_c: f32,
    pub eye_stdev: f32,
    /// Mean absolute difference between opposite sectors (C)
    pub cloud_symmetry: f32,
    pub eye_texture: SpectralTexture,
    pub cloud_texture: SpectralTexture,
}

/// Statistics derived from the ring samples once the cloud-top ring is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneStats {
    pub cloud_temp_c: f32,
    pub sector_mean_temp_c: f32,
    pub eye_stdev: f32,
    pub cloud_symmetry: f32,
    pub eye_texture: SpectralTexture,
    pub cloud_texture: SpectralTexture,
    pub sectors: SectorStats,
}

/// Compute sector and spectral statistics for samples around a storm.
///
/// `ring_km` positions the warm-ring annulus. Fails with
/// `AdtError::Config` for an invalid calibration.
pub fn scene_statistics(
    samples: &[RingSample],
    ring_km: f32,
    calibration: &Calibration,
) -> AdtResult<SceneStats> {
    calibration.validate().map_err(AdtError::config)?;
    let inner = calibration.ring_start_km;
    let outer = calibration.ring_end_km;

    let cloud_hist = temperature_histogram(
        samples
            .iter()
            .filter(|s| s.distance_km >= inner && s.distance_km <= outer)
            .map(|s| kelvin_to_celsius(s.temp_k)),
    );
    let eye_hist = temperature_histogram(
        samples
            .iter()
            .filter(|s| s.distance_km < inner)
            .map(|s| kelvin_to_celsius(s.temp_k)),
    );

    let cloud_texture = spectral_texture(&cloud_hist)?;
    let eye_texture = spectral_texture(&eye_hist)?;

    let sectors = SectorStats::compute(samples, calibration);
    let cloud_temp_c = warm_ring_mean(samples, ring_km)?;

    tracing::debug!(
        cloud_temp_c,
        cloud_harmonics = cloud_texture.harmonics,
        eye_harmonics = eye_texture.harmonics,
        symmetry = sectors.symmetry.mean,
        "Computed scene statistics"
    );

    Ok(SceneStats {
        cloud_temp_c,
        sector_mean_temp_c: sectors.sector_means.mean,
        eye_stdev: sectors.eye.stdev,
        cloud_symmetry: sectors.symmetry.mean,
        eye_texture,
        cloud_texture,
        sectors,
    })
}

/// Extract the feature record for a storm grid.
///
/// Fails with `AdtError::Config` for an invalid calibration, and with
/// `TemperatureOutOfRange` for implausible eye or cloud temperatures.
pub fn extract_features(grid: &StormGrid, calibration: &Calibration) -> AdtResult<FeatureRecord> {
    calibration.validate().map_err(AdtError::config)?;
    let (lat, lon) = grid.center();
    let samples = sample_rings(grid, calibration);

    let eye = eye_temperature(&samples, grid.center_temp(), calibration)?;
    let top = cloud_top_temperature(&samples, calibration)?;
    let stats = scene_statistics(&samples, top.ring_km, calibration)?;

    let warmest = match calibration.eye_mode {
        EyeTemperatureMode::Maximum => None,
        EyeTemperatureMode::WarmestPixel => {
            let (wlat, wlon) = geodesy::destination(
                lat as f64,
                lon as f64,
                eye.warmest.distance_km as f64,
                eye.warmest.bearing_deg as f64,
            );
            Some(WarmestSpot {
                temp_c: eye.warmest.temp_c,
                lat: wlat as f32,
                lon: wlon as f32,
            })
        }
    };

    tracing::debug!(
        eye_temp_c = eye.temp_c,
        cloud_top_temp_c = top.temp_c,
        ring_km = top.ring_km,
        "Extracted storm features"
    );

    Ok(FeatureRecord {
        lat,
        lon,
        image_time: grid.image_time(),
        eye_temp_c: eye.temp_c,
        warmest,
        cloud_top_temp_c: top.temp_c,
        cloud_top_ring_km: top.ring_km,
        cloud_temp_c: stats.cloud_temp_c,
        sector_mean_temp_c: stats.sector_mean_temp_c,
        eye_stdev: stats.eye_stdev,
        cloud_symmetry: stats.cloud_symmetry,
        eye_texture: stats.eye_texture,
        cloud_texture: stats.cloud_texture,
    })
}
