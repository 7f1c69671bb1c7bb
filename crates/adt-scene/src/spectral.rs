//! Spectral texture of temperature histograms.
//!
//! Ring temperatures are binned into a 64-bin histogram, 2C wide, from 26C
//! downward. The histogram is transformed with a split-radix FFT and the
//! magnitude spectrum summarized by its count of local maxima (harmonics)
//! and a normalized energy.

use adt_common::{AdtError, AdtResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of histogram bins and transform length.
pub const HISTOGRAM_BINS: usize = 64;

/// Warm edge of the first histogram bin (C).
const HISTOGRAM_TOP_C: f32 = 26.0;

/// Width of each histogram bin (C).
const HISTOGRAM_STEP_C: f32 = 2.0;

/// Last (1-based) spectral bin examined for harmonics.
const LAST_HARMONIC_BIN: usize = 31;

/// Margin, relative to the DC magnitude, a bin must exceed both
/// neighbours by to count as a peak.
const PEAK_TOLERANCE: f64 = 1e-9;

/// Summary of a magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralTexture {
    /// Local maxima among spectral bins 2..=31 (1-based)
    pub harmonics: u32,
    /// Mean adjacent-bin magnitude normalized by the DC term.
    /// `None` when the histogram is empty.
    pub energy: Option<f64>,
}

/// Histogram of Celsius temperatures.
///
/// Bin `j` spans `(26 - 2(j + 1), 26 - 2j]`, so every value lands in at
/// most one bin. The coldest bin is never filled.
pub fn temperature_histogram<I>(temps_c: I) -> [f64; HISTOGRAM_BINS]
where
    I: IntoIterator<Item = f32>,
{
    let mut counts = [0.0f64; HISTOGRAM_BINS];
    for t in temps_c {
        for (j, count) in counts.iter_mut().take(HISTOGRAM_BINS - 1).enumerate() {
            let upper = HISTOGRAM_TOP_C - j as f32 * HISTOGRAM_STEP_C;
            let lower = upper - HISTOGRAM_STEP_C;
            if t <= upper && t > lower {
                *count += 1.0;
            }
        }
    }
    counts
}

/// Duhamel-Hollman split-radix decimation-in-frequency FFT, in place.
///
/// `re` and `im` must have the same power-of-two length of at least 2.
/// Returns the transform length.
pub fn split_radix_fft(re: &mut [f64], im: &mut [f64]) -> AdtResult<usize> {
    let n = re.len();
    if im.len() != n {
        return Err(AdtError::fft(format!(
            "real and imaginary lengths differ ({} vs {})",
            n,
            im.len()
        )));
    }
    if n < 2 || !n.is_power_of_two() {
        return Err(AdtError::fft(format!(
            "transform length {} is not a power of two >= 2",
            n
        )));
    }

    // The butterflies below index from 1.
    let mut px = vec![0.0f64; n + 1];
    let mut py = vec![0.0f64; n + 1];
    px[1..].copy_from_slice(re);
    py[1..].copy_from_slice(im);

    let m = n.trailing_zeros() as usize;
    let mut n2 = n * 2;
    for _ in 1..m {
        n2 /= 2;
        let n4 = n2 / 4;
        let e = 2.0 * PI / n2 as f64;
        let mut a = 0.0f64;
        for j in 1..=n4 {
            let a3 = 3.0 * a;
            let (ss1, cc1) = a.sin_cos();
            let (ss3, cc3) = a3.sin_cos();
            a = j as f64 * e;

            let mut is = j;
            let mut id = 2 * n2;
            while is < n {
                let mut i0 = is;
                while i0 < n {
                    let i1 = i0 + n4;
                    let i2 = i1 + n4;
                    let i3 = i2 + n4;

                    let mut r1 = px[i0] - px[i2];
                    px[i0] += px[i2];
                    let mut r2 = px[i1] - px[i3];
                    px[i1] += px[i3];
                    let s1 = py[i0] - py[i2];
                    py[i0] += py[i2];
                    let mut s2 = py[i1] - py[i3];
                    py[i1] += py[i3];

                    let s3 = r1 - s2;
                    r1 += s2;
                    s2 = r2 - s1;
                    r2 += s1;

                    px[i2] = r1 * cc1 - s2 * ss1;
                    py[i2] = -s2 * cc1 - r1 * ss1;
                    px[i3] = s3 * cc3 + r2 * ss3;
                    py[i3] = r2 * cc3 - s3 * ss3;

                    i0 += id;
                }
                is = 2 * id - n2 + j;
                id *= 4;
            }
        }
    }

    // Length-2 butterflies
    let mut is = 1;
    let mut id = 4;
    while is < n {
        let mut i0 = is;
        while i0 < n {
            let i1 = i0 + 1;
            let r1 = px[i0];
            px[i0] = r1 + px[i1];
            px[i1] = r1 - px[i1];
            let r1 = py[i0];
            py[i0] = r1 + py[i1];
            py[i1] = r1 - py[i1];
            i0 += id;
        }
        is = 2 * id - 1;
        id *= 4;
    }

    // Bit reversal
    let mut j = 1;
    for i in 1..n {
        if i < j {
            px.swap(i, j);
            py.swap(i, j);
        }
        let mut k = n / 2;
        while k < j {
            j -= k;
            k /= 2;
        }
        j += k;
    }

    re.copy_from_slice(&px[1..]);
    im.copy_from_slice(&py[1..]);
    Ok(n)
}

/// Transform a histogram and summarize its magnitude spectrum.
pub fn spectral_texture(histogram: &[f64; HISTOGRAM_BINS]) -> AdtResult<SpectralTexture> {
    let mut re = histogram.to_vec();
    let mut im = vec![0.0f64; HISTOGRAM_BINS];
    split_radix_fft(&mut re, &mut im)?;

    let magnitude: Vec<f64> = re.iter().zip(&im).map(|(r, i)| r.hypot(*i)).collect();

    let floor = PEAK_TOLERANCE * magnitude[0];
    let mut harmonics = 0;
    let mut sum = 0.0;
    for k in 1..LAST_HARMONIC_BIN {
        sum += (magnitude[k] + magnitude[k - 1]) / 2.0;
        if magnitude[k] > magnitude[k - 1] + floor && magnitude[k] > magnitude[k + 1] + floor {
            harmonics += 1;
        }
    }

    let energy = if magnitude[0] > 0.0 {
        Some(sum / (LAST_HARMONIC_BIN - 1) as f64 / magnitude[0])
    } else {
        None
    };

    let occupied = histogram.iter().filter(|&&c| c > 0.0).count();
    if occupied <= 1 {
        // Flat spectrum: no texture information
        tracing::debug!(occupied, harmonics, ?energy, "Degenerate temperature histogram");
    }

    Ok(SpectralTexture { harmonics, energy })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_dft_magnitude(input: &[f64]) -> Vec<f64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                let (mut re, mut im) = (0.0, 0.0);
                for (t, &x) in input.iter().enumerate() {
                    let angle = -2.0 * PI * (k * t) as f64 / n as f64;
                    re += x * angle.cos();
                    im += x * angle.sin();
                }
                re.hypot(im)
            })
            .collect()
    }

    #[test]
    fn test_fft_matches_naive_dft() {
        let input: Vec<f64> = (0..64)
            .map(|i| ((i * 7 % 13) as f64) + (i as f64 * 0.3).sin() * 4.0)
            .collect();
        let mut re = input.clone();
        let mut im = vec![0.0; 64];
        assert_eq!(split_radix_fft(&mut re, &mut im).unwrap(), 64);

        let expected = naive_dft_magnitude(&input);
        for k in 0..64 {
            let got = re[k].hypot(im[k]);
            assert!(
                (got - expected[k]).abs() < 1e-9 * expected[0].max(1.0),
                "bin {}: got {}, expected {}",
                k,
                got,
                expected[k]
            );
        }
    }

    #[test]
    fn test_fft_small_lengths() {
        let mut re = vec![1.0, 2.0];
        let mut im = vec![0.0, 0.0];
        split_radix_fft(&mut re, &mut im).unwrap();
        assert_eq!(re, vec![3.0, -1.0]);

        let input = vec![1.0, 0.0, -1.0, 0.5, 2.0, 0.0, 0.0, 1.0];
        let mut re = input.clone();
        let mut im = vec![0.0; 8];
        split_radix_fft(&mut re, &mut im).unwrap();
        let expected = naive_dft_magnitude(&input);
        for k in 0..8 {
            assert!((re[k].hypot(im[k]) - expected[k]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fft_rejects_bad_lengths() {
        let mut re = vec![0.0; 48];
        let mut im = vec![0.0; 48];
        assert!(matches!(
            split_radix_fft(&mut re, &mut im),
            Err(AdtError::Fft(_))
        ));

        let mut re: Vec<f64> = vec![];
        let mut im: Vec<f64> = vec![];
        assert!(split_radix_fft(&mut re, &mut im).is_err());

        let mut re = vec![0.0; 64];
        let mut im = vec![0.0; 32];
        assert!(split_radix_fft(&mut re, &mut im).is_err());
    }

    #[test]
    fn test_histogram_bins() {
        let hist = temperature_histogram([25.0, 17.0, -73.2, -200.0]);
        assert_eq!(hist[0], 1.0); // 24..26
        assert_eq!(hist[4], 1.0); // 16..18
        assert_eq!(hist[49], 1.0); // -74..-72
        assert_eq!(hist.iter().sum::<f64>(), 3.0, "values below the range are dropped");
    }

    #[test]
    fn test_histogram_edge_goes_to_colder_bin() {
        let hist = temperature_histogram([20.0]);
        assert_eq!(hist[3], 1.0); // 18..20
        assert_eq!(hist[2], 0.0);
    }

    #[test]
    fn test_histogram_is_a_partition() {
        let hist = temperature_histogram([20.0, -10.0, 26.0, 24.0]);
        assert_eq!(hist.iter().sum::<f64>(), 4.0);
        assert_eq!(hist[0], 1.0); // 26 is the top of 24..26
        assert_eq!(hist[1], 1.0); // 24 falls into 22..24
    }

    #[test]
    fn test_empty_histogram_has_no_energy() {
        let texture = spectral_texture(&[0.0; HISTOGRAM_BINS]).unwrap();
        assert_eq!(texture.harmonics, 0);
        assert_eq!(texture.energy, None);
    }

    #[test]
    fn test_single_bin_histogram_is_flat() {
        let mut hist = [0.0; HISTOGRAM_BINS];
        hist[10] = 25.0;
        let texture = spectral_texture(&hist).unwrap();
        // An impulse has a flat magnitude spectrum: no interior maxima
        assert_eq!(texture.harmonics, 0);
        let energy = texture.energy.unwrap();
        assert!((energy - 1.0).abs() < 1e-9, "energy {}", energy);
    }

    #[test]
    fn test_two_separated_bins_produce_harmonics() {
        let mut hist = [0.0; HISTOGRAM_BINS];
        hist[2] = 40.0;
        hist[50] = 40.0;
        let texture = spectral_texture(&hist).unwrap();
        assert!(texture.harmonics > 2, "got {}", texture.harmonics);
    }
}
