//! Common types shared by the ADT scene analysis crates.

pub mod calibration;
pub mod error;
pub mod grid;
pub mod history;
pub mod scene;

pub use calibration::{Calibration, EyeTemperatureMode, SensorResolution};
pub use error::{AdtError, AdtResult};
pub use grid::StormGrid;
pub use history::HistoryRecord;
pub use scene::{CdoMeasurement, CloudScene, EyeScene, SceneResult};

/// Offset between Kelvin and Celsius used throughout the ADT calibration.
pub const KELVIN_OFFSET: f32 = 273.16;

/// Convert a brightness temperature in Kelvin to Celsius.
pub fn kelvin_to_celsius(kelvin: f32) -> f32 {
    kelvin - KELVIN_OFFSET
}

/// Convert a temperature in Celsius to Kelvin.
pub fn celsius_to_kelvin(celsius: f32) -> f32 {
    celsius + KELVIN_OFFSET
}
