//! Scene labels and the classification result.

use serde::{Deserialize, Serialize};

/// Eye scene type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeScene {
    Clear = 0,
    Pinhole = 1,
    Large = 2,
    None = 3,
}

impl EyeScene {
    /// Numeric code used by the ADT history files.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Clear),
            1 => Some(Self::Pinhole),
            2 => Some(Self::Large),
            3 => Some(Self::None),
            _ => None,
        }
    }

    /// True for every eye type except `None`.
    pub fn has_eye(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "EYE",
            Self::Pinhole => "PINHOLE EYE",
            Self::Large => "LARGE EYE",
            Self::None => "NO EYE",
        }
    }
}

impl std::fmt::Display for EyeScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cloud pattern type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudScene {
    Uniform = 0,
    EmbeddedCenter = 1,
    IrregularCdo = 2,
    CurvedBand = 3,
    Shear = 4,
}

impl CloudScene {
    /// Numeric code used by the ADT history files.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Uniform),
            1 => Some(Self::EmbeddedCenter),
            2 => Some(Self::IrregularCdo),
            3 => Some(Self::CurvedBand),
            4 => Some(Self::Shear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uniform => "UNIFORM CDO",
            Self::EmbeddedCenter => "EMBEDDED CENTER",
            Self::IrregularCdo => "IRREGULAR CDO",
            Self::CurvedBand => "CURVED BAND",
            Self::Shear => "SHEAR",
        }
    }
}

impl std::fmt::Display for CloudScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CDO size measured at one BD level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdoMeasurement {
    /// BD curve level used as the threshold
    pub level: usize,
    /// Mean quadrant radius in km, 0 when fewer than three quadrants are valid
    pub size_km: f32,
    /// Ratio of opposite quadrant pair sums, always >= 1 when measured
    pub asymmetry: f32,
}

/// Outcome of scene classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResult {
    pub eye_scene: EyeScene,
    pub cloud_scene: CloudScene,
    /// Eye radius, CDO radius or shear distance depending on the scene (km)
    pub eye_cdo_size_km: f32,
    /// BD level at which the curved band was matched, 0 when none
    pub curved_band_ring: usize,
    /// Consecutive spiral arcs matched at the storm center
    pub curved_band_value: u32,
    /// Best consecutive arcs found by the box search
    pub max_curved_band_value: u32,
    pub max_curved_band_lat: f32,
    pub max_curved_band_lon: f32,
    /// Radius of maximum wind, -99.9 when unavailable (km)
    pub rmw_km: f32,
    /// Composite eye score; an eye is present at 0.5 and above
    pub eye_score: f32,
    /// Composite cloud score
    pub cloud_score: f32,
    /// CDO sizes at BD levels 2 through 6, empty unless measured
    pub cdo_profile: Vec<CdoMeasurement>,
    /// Points of the matched curved band spiral as (lat, lon)
    pub spiral_arc: Vec<(f32, f32)>,
}
