//! Storm-centered infrared image grid.

use crate::error::{AdtError, AdtResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A georeferenced brightness temperature image centered on a storm.
///
/// Arrays are row-major with `numx` columns and `numy` rows. The storm
/// center is the pixel at `(numx / 2, numy / 2)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormGrid {
    numx: usize,
    numy: usize,
    lat: Vec<f32>,
    lon: Vec<f32>,
    /// Brightness temperature in Kelvin
    temp: Vec<f32>,
    /// Nominal image time, used for history lookups
    image_time: Option<NaiveDateTime>,
}

impl StormGrid {
    /// Create a grid from row-major latitude, longitude and temperature arrays.
    pub fn new(
        numx: usize,
        numy: usize,
        lat: Vec<f32>,
        lon: Vec<f32>,
        temp: Vec<f32>,
    ) -> AdtResult<Self> {
        if numx == 0 || numy == 0 {
            return Err(AdtError::invalid_grid(format!(
                "dimensions must be non-zero, got {}x{}",
                numx, numy
            )));
        }

        let expected = numx * numy;
        for (name, len) in [("lat", lat.len()), ("lon", lon.len()), ("temp", temp.len())] {
            if len != expected {
                return Err(AdtError::invalid_grid(format!(
                    "{} has {} values, expected {}",
                    name, len, expected
                )));
            }
        }

        Ok(Self {
            numx,
            numy,
            lat,
            lon,
            temp,
            image_time: None,
        })
    }

    /// Attach the nominal image time.
    pub fn with_image_time(mut self, time: NaiveDateTime) -> Self {
        self.image_time = Some(time);
        self
    }

    pub fn numx(&self) -> usize {
        self.numx
    }

    pub fn numy(&self) -> usize {
        self.numy
    }

    pub fn image_time(&self) -> Option<NaiveDateTime> {
        self.image_time
    }

    /// Column and row of the storm center pixel.
    pub fn center_index(&self) -> (usize, usize) {
        (self.numx / 2, self.numy / 2)
    }

    /// Latitude/longitude of the storm center pixel.
    pub fn center(&self) -> (f32, f32) {
        let (x, y) = self.center_index();
        (self.lat(x, y), self.lon(x, y))
    }

    /// Brightness temperature of the storm center pixel.
    pub fn center_temp(&self) -> f32 {
        let (x, y) = self.center_index();
        self.temp(x, y)
    }

    #[inline]
    pub fn flat_index(&self, x: usize, y: usize) -> usize {
        y * self.numx + x
    }

    #[inline]
    pub fn lat(&self, x: usize, y: usize) -> f32 {
        self.lat[self.flat_index(x, y)]
    }

    #[inline]
    pub fn lon(&self, x: usize, y: usize) -> f32 {
        self.lon[self.flat_index(x, y)]
    }

    #[inline]
    pub fn temp(&self, x: usize, y: usize) -> f32 {
        self.temp[self.flat_index(x, y)]
    }

    /// Number of pixels in the grid.
    pub fn len(&self) -> usize {
        self.temp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temp.is_empty()
    }

    /// Iterate over all pixels as `(lat, lon, temp)`.
    pub fn pixels(&self) -> impl Iterator<Item = (f32, f32, f32)> + '_ {
        self.lat
            .iter()
            .zip(self.lon.iter())
            .zip(self.temp.iter())
            .map(|((&lat, &lon), &temp)| (lat, lon, temp))
    }
}
