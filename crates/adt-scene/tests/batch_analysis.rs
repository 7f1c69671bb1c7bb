//! Tests for parallel batch analysis and result serialization.

use adt_scene::{
    AnalysisRequest, ClassifyOptions, CloudScene, EyeScene, SceneAnalyzer, SceneResult,
};
use test_utils::{
    create_cdo_storm_grid, create_eye_storm_grid, create_spiral_band_grid,
    create_uniform_storm_grid, reference_time, strengthening_eye_history,
};

fn requests() -> Vec<AnalysisRequest> {
    let strong = ClassifyOptions {
        prior_cycle_t: 4.0,
        ..Default::default()
    };
    vec![
        AnalysisRequest::new(create_eye_storm_grid(), strong),
        AnalysisRequest::new(create_uniform_storm_grid(280.0), ClassifyOptions::default()),
        AnalysisRequest::new(create_spiral_band_grid(210.0, 8.0, 270.0), strong),
        AnalysisRequest::new(create_uniform_storm_grid(330.0), ClassifyOptions::default()),
        AnalysisRequest::new(create_cdo_storm_grid(200.0, 120.0), strong),
        AnalysisRequest::new(
            create_eye_storm_grid().with_image_time(reference_time()),
            strong,
        )
        .with_history(strengthening_eye_history()),
    ]
}

// ============================================================================
// Batch analysis
// ============================================================================

#[test]
fn test_batch_matches_sequential() {
    let analyzer = SceneAnalyzer::default();
    let requests = requests();

    let batch = analyzer.analyze_batch(&requests);
    assert_eq!(batch.len(), requests.len());

    for (req, result) in requests.iter().zip(&batch) {
        let sequential = analyzer.analyze(&req.grid, &req.options, &req.history);
        match (result, sequential) {
            (Ok(b), Ok(s)) => {
                assert_eq!(b.scene, s.scene);
                assert_eq!(
                    serde_json::to_string(&b.features).unwrap(),
                    serde_json::to_string(&s.features).unwrap()
                );
            }
            (Err(b), Err(s)) => assert_eq!(b.to_string(), s.to_string()),
            (b, s) => panic!("batch {:?} differs from sequential {:?}", b, s),
        }
    }
}

#[test]
fn test_batch_isolates_failures() {
    let analyzer = SceneAnalyzer::default();
    let batch = analyzer.analyze_batch(&requests());

    // Only the 330 K grid fails
    let failed: Vec<usize> = batch
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_err())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(failed, vec![3]);

    let first = batch[0].as_ref().unwrap();
    assert_eq!(first.scene.eye_scene, EyeScene::Clear);
    let band = batch[2].as_ref().unwrap();
    assert_eq!(band.scene.cloud_scene, CloudScene::CurvedBand);
}

#[test]
fn test_empty_batch() {
    let analyzer = SceneAnalyzer::default();
    assert!(analyzer.analyze_batch(&[]).is_empty());
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_scene_result_json() {
    let analyzer = SceneAnalyzer::default();
    let options = ClassifyOptions {
        prior_cycle_t: 4.0,
        ..Default::default()
    };
    let scene = analyzer
        .analyze(&create_eye_storm_grid(), &options, &[])
        .unwrap()
        .scene;

    let value = serde_json::to_value(&scene).unwrap();
    assert_eq!(value["eye_scene"], "clear");
    assert_eq!(value["cloud_scene"], "uniform");
    assert!(value["cdo_profile"].as_array().unwrap().is_empty());

    let json = serde_json::to_string(&scene).unwrap();
    let parsed: SceneResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, scene);
}

#[test]
fn test_classify_options_json_defaults() {
    let options: ClassifyOptions = serde_json::from_str(r#"{"prior_cycle_t": 3.5}"#).unwrap();
    assert_eq!(options.prior_cycle_t, 3.5);
    assert_eq!(options.manual_eye_size_km, None);
    assert!(options.allow_box_search);
    assert!(!options.over_land);
}
