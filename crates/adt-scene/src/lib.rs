//! Tropical cyclone infrared scene classification.
//!
//! Implements the scene typing stage of the Advanced Dvorak Technique:
//! given a storm-centered grid of IR brightness temperatures, extract eye
//! and cloud features and label the image with an eye scene (clear,
//! pinhole, large, none) and a cloud scene (uniform CDO, embedded center,
//! irregular CDO, curved band, shear).
//!
//! # Pipeline
//!
//! ```text
//! StormGrid
//!      │
//!      ├─► ring::sample_rings          distance/bearing per pixel
//!      │
//!      ├─► temperature                 eye and cloud-top temperatures
//!      │
//!      ├─► features::scene_statistics  annulus, sectors, spectral texture
//!      │
//!      ▼
//! FeatureRecord ──► classifier::classify ──► SceneResult
//!                        │
//!                        ├─► rmw::estimate_rmw
//!                        ├─► spiral::match_spiral
//!                        └─► cdo::measure / cdo::shear_distance
//! ```
//!
//! # Example
//!
//! ```ignore
//! use adt_scene::{ClassifyOptions, SceneAnalyzer};
//! use adt_common::Calibration;
//!
//! let analyzer = SceneAnalyzer::new(&Calibration::from_env());
//! let analysis = analyzer.analyze(&grid, &ClassifyOptions::default(), &[])?;
//! ```

pub mod analyzer;
pub mod cdo;
pub mod classifier;
pub mod features;
pub mod history;
pub mod ring;
pub mod rmw;
pub mod spectral;
pub mod spiral;
pub mod stats;
pub mod temperature;

// Re-export commonly used types at crate root
pub use analyzer::{AnalysisRequest, SceneAnalysis, SceneAnalyzer};
pub use cdo::{CdoMode, CdoSize, SHEAR_MISSING_KM};
pub use classifier::{classify, ClassifyOptions};
pub use features::{extract_features, FeatureRecord, SceneStats, WarmestSpot};
pub use history::HistoryContext;
pub use rmw::{estimate_rmw, RmwEstimate, RMW_MISSING};
pub use spectral::SpectralTexture;
pub use spiral::{match_spiral, SpiralMatch, SpiralSearch};
pub use stats::SectorStats;

pub use adt_common::{
    AdtError, AdtResult, Calibration, CloudScene, EyeScene, HistoryRecord, SceneResult, StormGrid,
};
