//! High-level scene analysis service.
//!
//! `SceneAnalyzer` ties the extraction, statistics, RMW and classification
//! stages together behind one calibration. Batches of independent storms
//! are analyzed in parallel with rayon.
//!
//! # Example
//!
//! ```rust,ignore
//! use adt_scene::{ClassifyOptions, SceneAnalyzer};
//!
//! let analyzer = SceneAnalyzer::new(&Calibration::default());
//! let analysis = analyzer.analyze(&grid, &ClassifyOptions::default(), &history)?;
//! println!("{} / {}", analysis.scene.eye_scene, analysis.scene.cloud_scene);
//! ```

use crate::classifier::{self, ClassifyOptions};
use crate::features::{self, FeatureRecord, SceneStats};
use crate::ring::sample_rings;
use crate::rmw::{self, RmwEstimate};
use adt_common::{AdtError, AdtResult, Calibration, HistoryRecord, SceneResult, StormGrid};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One storm to analyze in a batch.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub grid: StormGrid,
    pub options: ClassifyOptions,
    /// Prior cycles of this storm, oldest first
    pub history: Vec<HistoryRecord>,
}

impl AnalysisRequest {
    pub fn new(grid: StormGrid, options: ClassifyOptions) -> Self {
        Self {
            grid,
            options,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryRecord>) -> Self {
        self.history = history;
        self
    }
}

/// Features and scene classification of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAnalysis {
    pub features: FeatureRecord,
    pub scene: SceneResult,
}

/// Scene analysis with a fixed calibration.
#[derive(Debug, Clone, Default)]
pub struct SceneAnalyzer {
    calibration: Calibration,
}

impl SceneAnalyzer {
    pub fn new(calibration: &Calibration) -> Self {
        Self {
            calibration: calibration.clone(),
        }
    }

    /// Create an analyzer, rejecting an inconsistent calibration.
    pub fn try_new(calibration: &Calibration) -> AdtResult<Self> {
        calibration.validate().map_err(AdtError::config)?;
        Ok(Self::new(calibration))
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Extract eye, cloud-top and texture features.
    pub fn extract_features(&self, grid: &StormGrid) -> AdtResult<FeatureRecord> {
        features::extract_features(grid, &self.calibration)
    }

    /// Recompute the annulus and sector statistics for extracted features.
    pub fn compute_scene_statistics(
        &self,
        features: &FeatureRecord,
        grid: &StormGrid,
    ) -> AdtResult<SceneStats> {
        let samples = sample_rings(grid, &self.calibration);
        features::scene_statistics(&samples, features.cloud_top_ring_km, &self.calibration)
    }

    /// Estimate the radius of maximum wind, or the -99.9 sentinel.
    pub fn estimate_rmw(&self, features: &FeatureRecord, grid: &StormGrid) -> RmwEstimate {
        rmw::estimate_rmw(grid, features.eye_temp_c, features.cloud_temp_c)
    }

    /// Classify the eye and cloud scene.
    pub fn classify_scene(
        &self,
        features: &FeatureRecord,
        options: &ClassifyOptions,
        grid: &StormGrid,
        history: &[HistoryRecord],
    ) -> AdtResult<SceneResult> {
        options.validate().map_err(AdtError::config)?;
        Ok(classifier::classify(
            features,
            grid,
            history,
            options,
            &self.calibration,
        ))
    }

    /// Extract features and classify in one call.
    pub fn analyze(
        &self,
        grid: &StormGrid,
        options: &ClassifyOptions,
        history: &[HistoryRecord],
    ) -> AdtResult<SceneAnalysis> {
        let features = self.extract_features(grid)?;
        let scene = self.classify_scene(&features, options, grid, history)?;
        Ok(SceneAnalysis { features, scene })
    }

    /// Analyze independent storms in parallel.
    ///
    /// Results are returned in request order. A failure in one storm does
    /// not affect the others.
    pub fn analyze_batch(&self, requests: &[AnalysisRequest]) -> Vec<AdtResult<SceneAnalysis>> {
        let start = std::time::Instant::now();

        let results: Vec<AdtResult<SceneAnalysis>> = requests
            .par_iter()
            .map(|req| self.analyze(&req.grid, &req.options, &req.history))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(failed, total = results.len(), "Batch analysis had failures");
        }
        tracing::debug!(
            storms = requests.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch analysis complete"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{create_eye_storm_grid, create_uniform_storm_grid};

    #[test]
    fn test_try_new_rejects_bad_calibration() {
        let cal = Calibration {
            ring_width_km: 0.0,
            ..Default::default()
        };
        let err = SceneAnalyzer::try_new(&cal).unwrap_err();
        assert!(!err.is_data_error());
        assert!(SceneAnalyzer::try_new(&Calibration::default()).is_ok());
    }

    #[test]
    fn test_classify_rejects_bad_options() {
        let analyzer = SceneAnalyzer::default();
        let grid = create_eye_storm_grid();
        let features = analyzer.extract_features(&grid).unwrap();
        let options = ClassifyOptions {
            manual_eye_size_km: Some(-1.0),
            ..Default::default()
        };
        let err = analyzer
            .classify_scene(&features, &options, &grid, &[])
            .unwrap_err();
        assert!(matches!(err, AdtError::Config(_)));
    }

    #[test]
    fn test_statistics_match_features() {
        let analyzer = SceneAnalyzer::default();
        let grid = create_eye_storm_grid();
        let features = analyzer.extract_features(&grid).unwrap();
        let stats = analyzer.compute_scene_statistics(&features, &grid).unwrap();
        assert_eq!(stats.cloud_temp_c, features.cloud_temp_c);
        assert_eq!(stats.cloud_symmetry, features.cloud_symmetry);
    }

    #[test]
    fn test_rmw_sentinel_on_uniform_grid() {
        let analyzer = SceneAnalyzer::default();
        let grid = create_uniform_storm_grid(280.0);
        let features = analyzer.extract_features(&grid).unwrap();
        assert_eq!(analyzer.estimate_rmw(&features, &grid).rmw_km, -99.9);
    }
}
