//! Error types for scene analysis.

use thiserror::Error;

/// Errors that abort a scene analysis pass.
///
/// Measurements that are merely unavailable (no eyewall crossing, too few
/// CDO quadrants, no spiral match) are reported as sentinel values on the
/// result types instead.
#[derive(Debug, Error)]
pub enum AdtError {
    /// The spectral transform rejected its input.
    #[error("fft failed: {0}")]
    Fft(String),

    /// A derived temperature fell outside the physically plausible range.
    #[error("{quantity} temperature {celsius:.2}C is outside [-100, 40]C")]
    TemperatureOutOfRange {
        quantity: &'static str,
        celsius: f32,
    },

    /// The storm grid is malformed.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The calibration is invalid or could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AdtError {
    /// Create an Fft error.
    pub fn fft(msg: impl Into<String>) -> Self {
        Self::Fft(msg.into())
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the failure came from input data rather than configuration.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

impl From<serde_yaml::Error> for AdtError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for scene analysis.
pub type AdtResult<T> = Result<T, AdtError>;
