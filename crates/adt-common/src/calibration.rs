//! Calibration for the scene analysis.
//!
//! A [`Calibration`] is an immutable value handed to every analysis step.
//! Defaults reproduce the AODT v7.2 operational settings.

use crate::error::{AdtError, AdtResult};
use serde::{Deserialize, Serialize};

/// Number of boundaries in the BD enhancement curve.
pub const BD_CURVE_LEN: usize = 11;

/// Number of ordinal temperature categories defined by the BD curve.
pub const BD_CATEGORIES: usize = BD_CURVE_LEN - 1;

/// BD enhancement curve boundaries in Celsius, warm to cold.
pub const DEFAULT_BD_CURVE: [f32; BD_CURVE_LEN] = [
    30.0, 9.0, -30.0, -42.0, -54.0, -64.0, -70.0, -76.0, -80.0, -84.0, -100.0,
];

/// Position of a temperature on the BD curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BdCategory {
    /// Ordinal category, 0 (warmest) to 9 (coldest)
    pub category: usize,
    /// Category plus the fractional position inside it
    pub part: f32,
}

/// Upper bound on cloud-top rings accepted by `validate`.
const MAX_RINGS: usize = 10_000;

/// Configuration for scene analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// BD curve boundaries in Celsius, strictly decreasing.
    pub bd_curve: [f32; BD_CURVE_LEN],

    /// Inner radius of the cloud-top ring search (km).
    pub ring_start_km: f32,

    /// Outer radius of the cloud-top ring search (km).
    pub ring_end_km: f32,

    /// Width of each cloud-top ring (km).
    pub ring_width_km: f32,

    /// Radius searched for the warmest eye pixel (km).
    pub eye_search_radius_km: f32,

    /// Radius used when the eye temperature mode is `WarmestPixel` (km).
    pub warmest_pixel_radius_km: f32,

    /// How the eye temperature is chosen.
    pub eye_mode: EyeTemperatureMode,

    /// Imager resolution class.
    pub sensor: SensorResolution,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            bd_curve: DEFAULT_BD_CURVE,
            ring_start_km: 24.0,
            ring_end_km: 136.0,
            ring_width_km: 4.0,
            eye_search_radius_km: 24.0,
            warmest_pixel_radius_km: 75.0,
            eye_mode: EyeTemperatureMode::Maximum,
            sensor: SensorResolution::Standard,
        }
    }
}

impl Calibration {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ADT_RING_START_KM") {
            if let Ok(km) = val.parse() {
                config.ring_start_km = km;
            }
        }

        if let Ok(val) = std::env::var("ADT_RING_END_KM") {
            if let Ok(km) = val.parse() {
                config.ring_end_km = km;
            }
        }

        if let Ok(val) = std::env::var("ADT_RING_WIDTH_KM") {
            if let Ok(km) = val.parse() {
                config.ring_width_km = km;
            }
        }

        if let Ok(val) = std::env::var("ADT_EYE_SEARCH_RADIUS_KM") {
            if let Ok(km) = val.parse() {
                config.eye_search_radius_km = km;
            }
        }

        if let Ok(val) = std::env::var("ADT_EYE_MODE") {
            config.eye_mode = EyeTemperatureMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("ADT_SENSOR") {
            config.sensor = SensorResolution::from_str(&val);
        }

        config
    }

    /// Parse a calibration from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> AdtResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate().map_err(AdtError::config)?;
        Ok(config)
    }

    /// Load a calibration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> AdtResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AdtError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.bd_curve.windows(2).any(|w| w[1] >= w[0]) {
            return Err("bd_curve must be strictly decreasing".to_string());
        }

        if !(self.ring_width_km.is_finite() && self.ring_width_km > 0.0) {
            return Err("ring_width_km must be > 0".to_string());
        }

        if !(self.ring_start_km >= 0.0 && self.ring_end_km > self.ring_start_km)
            || !self.ring_end_km.is_finite()
        {
            return Err("ring_end_km must be greater than ring_start_km >= 0".to_string());
        }

        if self.ring_count() > MAX_RINGS {
            return Err(format!("ring_width_km gives more than {} rings", MAX_RINGS));
        }

        if self.eye_search_radius_km <= 0.0 || self.warmest_pixel_radius_km <= 0.0 {
            return Err("eye search radii must be > 0".to_string());
        }

        Ok(())
    }

    /// Number of cloud-top rings between the inner and outer radius.
    pub fn ring_count(&self) -> usize {
        if self.ring_width_km <= 0.0 || self.ring_end_km <= self.ring_start_km {
            return 0;
        }
        ((self.ring_end_km - self.ring_start_km) / self.ring_width_km) as usize
    }

    /// Radius beyond which pixels are no longer sampled (km).
    pub fn sample_radius_km(&self) -> f32 {
        self.ring_end_km + 80.0
    }

    /// BD boundary `level` converted to Kelvin.
    pub fn bd_kelvin(&self, level: usize) -> f32 {
        crate::celsius_to_kelvin(self.bd_curve[level])
    }

    /// Bucket a Celsius temperature into its BD category.
    ///
    /// Temperatures warmer than the first boundary fall in category 0 and
    /// temperatures at or below the last boundary in the coldest category.
    pub fn categorize(&self, celsius: f32) -> BdCategory {
        let bd = &self.bd_curve;
        let category = (0..BD_CATEGORIES)
            .find(|&i| celsius <= bd[i] && celsius > bd[i + 1])
            .unwrap_or(if celsius <= bd[BD_CURVE_LEN - 1] {
                BD_CATEGORIES - 1
            } else {
                0
            });

        let part = if category == 0 {
            0.0
        } else {
            (celsius - bd[category]) / (bd[category + 1] - bd[category])
        };

        BdCategory {
            category,
            part: category as f32 + part,
        }
    }
}

/// How the eye temperature is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeTemperatureMode {
    /// Warmest pixel within the eye search radius (operational default).
    #[default]
    Maximum,
    /// Center pixel temperature, with the warmest pixel in a wider radius
    /// recorded separately.
    WarmestPixel,
}

impl EyeTemperatureMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "warmest_pixel" | "warmest" => Self::WarmestPixel,
            _ => Self::Maximum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maximum => "maximum",
            Self::WarmestPixel => "warmest_pixel",
        }
    }
}

impl std::fmt::Display for EyeTemperatureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Imager resolution class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorResolution {
    /// 4 km class imagers.
    #[default]
    Standard,
    /// Coarse imagers with roughly 8 km pixels.
    Coarse,
}

impl SensorResolution {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "coarse" | "12" | "12km" => Self::Coarse,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Coarse => "coarse",
        }
    }

    /// Search distance used when matching pixels to spiral points (km).
    pub fn effective_resolution_km(&self) -> f32 {
        match self {
            Self::Standard => 6.0,
            Self::Coarse => 12.0,
        }
    }
}

impl std::fmt::Display for SensorResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
