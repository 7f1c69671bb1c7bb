//! Sector partitioning and sample moments.

use crate::ring::RingSample;
use adt_common::{kelvin_to_celsius, Calibration};
use serde::{Deserialize, Serialize};

/// Number of angular sectors around the storm.
pub const SECTOR_COUNT: usize = 24;

/// Angular width of each sector in degrees.
pub const SECTOR_WIDTH_DEG: f32 = 360.0 / SECTOR_COUNT as f32;

/// Mean, sample standard deviation and skew of a data set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f32,
    pub stdev: f32,
    pub skew: f32,
}

impl Moments {
    /// Compute the moments of `values`.
    ///
    /// An empty slice yields all zeros. With one value, or with no spread,
    /// stdev and skew are zero.
    pub fn of(values: &[f32]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self::default();
        }

        let mean = values.iter().sum::<f32>() / n as f32;
        if n == 1 {
            return Self {
                mean,
                ..Default::default()
            };
        }

        let (a2, a3) = values.iter().fold((0.0f32, 0.0f32), |(a2, a3), &v| {
            let d = v - mean;
            (a2 + d * d, a3 + d * d * d)
        });
        let denom = (n - 1) as f32;
        let stdev = (a2 / denom).sqrt();
        let skew = if stdev > 0.0 {
            (a3 / denom) / (stdev * stdev * stdev)
        } else {
            0.0
        };

        Self { mean, stdev, skew }
    }
}

/// Sector index for a bearing. Every bearing maps to exactly one sector.
pub fn sector_index(bearing_deg: f32) -> usize {
    let b = if bearing_deg >= 360.0 || bearing_deg < 0.0 {
        bearing_deg.rem_euclid(360.0)
    } else {
        bearing_deg
    };
    ((b / SECTOR_WIDTH_DEG) as usize).min(SECTOR_COUNT - 1)
}

/// Temperature at the warm-end 90th percentile position.
///
/// Sorting warm to cold and taking index `floor(n - 0.1n)` drops the
/// coldest tenth of the sector as outliers.
pub fn trimmed_minimum(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let n = sorted.len() as f32;
    let idx = ((n - n * 0.1) as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Statistics for one angular sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub count: usize,
    pub moments: Moments,
    pub trimmed_min_c: Option<f32>,
}

/// Sector statistics of the cloud-top region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorStats {
    pub sectors: Vec<SectorSummary>,
    /// Moments of the 24 sector means
    pub sector_means: Moments,
    /// Moments of `|mean[i] - mean[i + 12]|` over opposite sector pairs
    pub symmetry: Moments,
    /// Moments of eye-region temperatures
    pub eye: Moments,
}

impl SectorStats {
    /// Partition ring samples into sectors and compute their statistics.
    ///
    /// Temperatures are in Celsius. Cloud sectors use samples between the
    /// inner and outer ring radius; the eye uses samples inside the inner
    /// radius.
    pub fn compute(samples: &[RingSample], calibration: &Calibration) -> Self {
        let inner = calibration.ring_start_km;
        let outer = calibration.ring_end_km;

        let mut buckets: Vec<Vec<f32>> = vec![Vec::new(); SECTOR_COUNT];
        let mut eye = Vec::new();

        for s in samples {
            let temp_c = kelvin_to_celsius(s.temp_k);
            if s.distance_km >= inner && s.distance_km <= outer {
                buckets[sector_index(s.bearing_deg)].push(temp_c);
            }
            if s.distance_km <= inner {
                eye.push(temp_c);
            }
        }

        let sectors: Vec<SectorSummary> = buckets
            .iter()
            .map(|values| SectorSummary {
                count: values.len(),
                moments: Moments::of(values),
                trimmed_min_c: trimmed_minimum(values),
            })
            .collect();

        let means: Vec<f32> = sectors.iter().map(|s| s.moments.mean).collect();
        let half = SECTOR_COUNT / 2;
        let diffs: Vec<f32> = (0..half).map(|i| (means[i] - means[i + half]).abs()).collect();

        Self {
            sector_means: Moments::of(&means),
            symmetry: Moments::of(&diffs),
            eye: Moments::of(&eye),
            sectors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments_known_values() {
        let m = Moments::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((m.mean - 5.0).abs() < 1e-6);
        // Sample stdev with n - 1 in the denominator
        assert!((m.stdev - (32.0f32 / 7.0).sqrt()).abs() < 1e-5);
        assert!(m.skew > 0.0, "right tail should give positive skew");
    }

    #[test]
    fn test_moments_degenerate() {
        assert_eq!(Moments::of(&[]), Moments::default());

        let single = Moments::of(&[12.5]);
        assert_eq!(single.mean, 12.5);
        assert_eq!(single.stdev, 0.0);
        assert_eq!(single.skew, 0.0);

        let flat = Moments::of(&[3.0, 3.0, 3.0]);
        assert_eq!(flat.stdev, 0.0);
        assert_eq!(flat.skew, 0.0);
    }

    #[test]
    fn test_sector_partition_is_total() {
        let mut counts = [0usize; SECTOR_COUNT];
        let mut b = 0.0f32;
        while b < 360.0 {
            counts[sector_index(b)] += 1;
            b += 0.25;
        }
        assert!(counts.iter().all(|&c| c == 60), "{:?}", counts);
        assert_eq!(sector_index(360.0), 0);
        assert_eq!(sector_index(359.999), 23);
        assert_eq!(sector_index(15.0), 1);
    }

    #[test]
    fn test_trimmed_minimum() {
        assert_eq!(trimmed_minimum(&[]), None);
        assert_eq!(trimmed_minimum(&[-40.0]), Some(-40.0));

        // Ten values: index 9 after sorting warm to cold is the coldest
        let values: Vec<f32> = (0..10).map(|i| -(i as f32)).collect();
        assert_eq!(trimmed_minimum(&values), Some(-9.0));

        // Twenty values: index 18 skips the single coldest outlier
        let values: Vec<f32> = (0..20).map(|i| -(i as f32)).collect();
        assert_eq!(trimmed_minimum(&values), Some(-18.0));
    }

    #[test]
    fn test_symmetric_ring_has_zero_asymmetry() {
        let cal = Calibration::default();
        let samples: Vec<RingSample> = (0..360)
            .map(|deg| RingSample {
                distance_km: 60.0,
                bearing_deg: deg as f32,
                temp_k: 210.0,
            })
            .collect();

        let stats = SectorStats::compute(&samples, &cal);
        assert_eq!(stats.sectors.len(), SECTOR_COUNT);
        assert!(stats.sectors.iter().all(|s| s.count == 15));
        assert!(stats.symmetry.mean.abs() < 1e-4);
        assert!((stats.sector_means.mean - (210.0 - 273.16)).abs() < 1e-3);
    }

    #[test]
    fn test_asymmetric_ring() {
        let cal = Calibration::default();
        let samples: Vec<RingSample> = (0..360)
            .map(|deg| RingSample {
                distance_km: 60.0,
                bearing_deg: deg as f32,
                // Cold northern half, warm southern half
                temp_k: if deg < 90 || deg >= 270 { 200.0 } else { 260.0 },
            })
            .collect();

        let stats = SectorStats::compute(&samples, &cal);
        assert!((stats.symmetry.mean - 60.0).abs() < 1e-3);
    }
}
