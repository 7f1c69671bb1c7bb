//! Eye and cloud scene classification.
//!
//! Composite eye and cloud scores are built from BD curve categories,
//! spectral texture and storm history. The cloud scene is then resolved by
//! a small state machine that may run the curved band search, the shear
//! distance measurement or fall back to a uniform/embedded scene.

use crate::cdo::{self, CdoMode, SHEAR_MISSING_KM};
use crate::features::FeatureRecord;
use crate::history::HistoryContext;
use crate::rmw::{estimate_rmw, RMW_MISSING};
use crate::spiral::{match_spiral, SpiralSearch};
use adt_common::calibration::BdCategory;
use adt_common::{
    Calibration, CdoMeasurement, CloudScene, EyeScene, HistoryRecord, SceneResult, StormGrid,
};
use serde::{Deserialize, Serialize};

/// Eye score at which an eye is declared.
const EYE_SCORE_THRESHOLD: f32 = 0.50;

/// Eye radius at which a clear eye becomes a large eye (km).
const LARGE_EYE_RADIUS_KM: f32 = 45.0;

/// Manually entered eye sizes below this indicate a pinhole eye (km).
const PINHOLE_MANUAL_SIZE_KM: f32 = 12.0;

/// Smallest reported shear distance (km).
const MIN_SHEAR_DISTANCE_KM: f32 = 4.0;

/// BD levels whose midpoint bounds the shear measurement.
const SHEAR_BD_LEVELS: (usize, usize) = (2, 3);

/// BD levels measured for the CDO profile. The first sets the scene size.
const CDO_PROFILE_LEVELS: std::ops::RangeInclusive<usize> = 2..=6;

/// Gray shade curved band levels, searched warm to cold.
const GRAY_BAND_LEVELS: [usize; 3] = [4, 3, 2];

/// Black and white curved band levels.
const BLACK_WHITE_BAND_LEVELS: [usize; 2] = [6, 5];

/// Caller-supplied inputs to classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Analyst-entered eye size; overrides the RMW estimate when set (km)
    pub manual_eye_size_km: Option<f32>,
    /// T-number used when there is no usable history
    pub prior_cycle_t: f32,
    /// Refine a curved band match by searching a 2 degree box
    pub allow_box_search: bool,
    /// The storm center is over land
    pub over_land: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            manual_eye_size_km: None,
            prior_cycle_t: 1.0,
            allow_box_search: true,
            over_land: false,
        }
    }
}

impl ClassifyOptions {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.manual_eye_size_km {
            if !size.is_finite() || size < 0.0 {
                return Err(format!("manual eye size {} must be >= 0", size));
            }
        }
        if !self.prior_cycle_t.is_finite() {
            return Err("prior cycle T-number must be finite".to_string());
        }
        Ok(())
    }

    fn manual_eye_size(&self) -> Option<f32> {
        self.manual_eye_size_km.filter(|&s| s > 0.0)
    }
}

/// BD categories of the three classifier temperatures.
#[derive(Debug, Clone, Copy)]
struct Categories {
    eye: BdCategory,
    cloud: BdCategory,
    cloud_top: BdCategory,
}

impl Categories {
    fn of(features: &FeatureRecord, calibration: &Calibration) -> Self {
        Self {
            eye: calibration.categorize(features.eye_temp_c),
            cloud: calibration.categorize(features.cloud_temp_c),
            cloud_top: calibration.categorize(features.cloud_top_temp_c),
        }
    }

    /// Cloud category minus cloud-top category.
    fn cloud_category_diff(&self) -> i32 {
        self.cloud.category as i32 - self.cloud_top.category as i32
    }

    /// Cloud category minus eye category.
    fn eye_cloud_category_diff(&self) -> i32 {
        self.cloud.category as i32 - self.eye.category as i32
    }
}

/// Shear threshold, midway between the two BD levels (K).
fn shear_threshold(calibration: &Calibration) -> f32 {
    let (warm, cold) = SHEAR_BD_LEVELS;
    (calibration.bd_kelvin(warm) + calibration.bd_kelvin(cold)) / 2.0
}

/// Composite eye score.
fn eye_score(features: &FeatureRecord, cats: &Categories, ctx: &HistoryContext) -> f32 {
    let a = 1.0 - (features.eye_texture.harmonics as f32 - 2.0) * 0.1;
    let b = -cats.eye.part * 0.5;
    let c = if features.eye_stdev > 10.0 { 0.5 } else { 0.0 };
    let d = (cats.cloud.part - cats.eye.part) * 0.25 + (cats.cloud_top.part - cats.eye.part) * 0.5;

    let mut e = if ctx.t_12h <= 4.5 {
        (ctx.t_12h - 4.5).max(-1.0)
    } else {
        0.0
    };
    // No usable record counts as an eye
    if ctx.found_at_12h
        && ctx.last_eye_scene.map_or(true, |s| s.has_eye())
        && ctx.max_t > 5.0
    {
        e += 0.25;
    }
    if ctx.last_rule9 && ctx.last_t < 4.0 {
        e -= 0.5;
    }

    a + b + c + d + e
}

/// Composite cloud score.
fn cloud_score(
    features: &FeatureRecord,
    cats: &Categories,
    ctx: &HistoryContext,
    eye_scene: EyeScene,
) -> f32 {
    let a = cats.cloud_top.part * 0.25;
    let b = cats.cloud.part * 0.25;
    let c = if features.cloud_texture.harmonics <= 2 {
        (cats.cloud_top.part * 0.25).min(1.5)
    } else {
        0.0
    };
    let d = if ctx.last_cloud_scene.code() >= CloudScene::CurvedBand.code() {
        -0.5
    } else {
        0.5
    };

    let mut e = 0.0;
    if cats.cloud_top.part > 2.0 {
        if ctx.t_12h >= 2.5 {
            if eye_scene == EyeScene::Clear {
                e = (ctx.t_12h - 2.5).min(1.0);
            }
            if ctx.t_12h >= 3.5 {
                e += 1.0;
            }
        }
        if ctx.found_at_12h && ctx.found_eye {
            e += 1.25;
        }
    }

    a + b + c + d + e
}

/// Scene hints derived from the cloud score.
#[derive(Debug, Clone, Copy, Default)]
struct CloudFlags {
    shear: bool,
    irregular_cdo: bool,
    curved_band: bool,
    gray_shade: bool,
    black_white: bool,
    embedded_center: bool,
    /// Shear inferred from a sparse band rather than the cloud score
    sparse_band: bool,
}

/// States of cloud scene resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloudState {
    Evaluating,
    ShearOverride,
    IrregularCdo,
    CurvedBandSearch,
    Fallback,
    Done,
}

/// Outcome of the curved band level search.
enum BandSearch {
    Found { level: usize, hits: u32 },
    ShearLike,
    NotFound,
}

struct Classifier<'a> {
    features: &'a FeatureRecord,
    grid: &'a StormGrid,
    options: &'a ClassifyOptions,
    calibration: &'a Calibration,
    cats: Categories,
    ctx: HistoryContext,
    eye_score: f32,
    cloud_score: f32,
    flags: CloudFlags,
    result: SceneResult,
}

impl<'a> Classifier<'a> {
    fn center(&self) -> (f32, f32) {
        (self.features.lat, self.features.lon)
    }

    fn spiral_hits(&self, level: usize) -> u32 {
        let threshold = self.calibration.bd_kelvin(level);
        match_spiral(self.grid, self.center(), threshold, SpiralSearch::Point, self.calibration)
            .consecutive_hits
    }

    fn run(mut self) -> SceneResult {
        let mut state = CloudState::Evaluating;
        while state != CloudState::Done {
            let next = match state {
                CloudState::Evaluating => self.evaluate(),
                CloudState::ShearOverride => self.shear_override(),
                CloudState::IrregularCdo => self.irregular_cdo(),
                CloudState::CurvedBandSearch => self.curved_band_search(),
                CloudState::Fallback => self.fallback(),
                CloudState::Done => CloudState::Done,
            };
            tracing::trace!(from = ?state, to = ?next, "Cloud scene transition");
            state = next;
        }

        self.cdo_profile();
        self.result.eye_score = self.eye_score;
        self.result.cloud_score = self.cloud_score;
        self.result
    }

    /// Set the cloud flags from the cloud score and pick the first state.
    fn evaluate(&mut self) -> CloudState {
        let f = self.features;
        let cats = self.cats;
        let total = self.cloud_score;
        let eye_scene = self.result.eye_scene;

        let cloud_temp_diff = f.cloud_temp_c - f.cloud_top_temp_c;
        let eye_minus_coldest = f.eye_temp_c - f.cloud_temp_c.min(f.cloud_top_temp_c);

        let mut flags = CloudFlags {
            curved_band: true,
            gray_shade: true,
            ..Default::default()
        };

        if total < 0.0 {
            flags.shear = true;
        }
        if total >= 1.0 && eye_minus_coldest < 0.0 && f.cloud_symmetry > 40.0 {
            flags.irregular_cdo = true;
        }
        if (2.0..3.0).contains(&total) {
            if eye_minus_coldest < 0.0 && f.cloud_symmetry > 30.0 {
                flags.irregular_cdo = true;
            }
            if cats.cloud_top.category >= 3 {
                if cats.cloud_category_diff() > 0 && cloud_temp_diff < -8.0 {
                    flags.gray_shade = false;
                    flags.black_white = true;
                }
                // Large or ragged eye
                if eye_scene == EyeScene::Clear
                    || (cats.eye.part > 1.0 && cats.eye_cloud_category_diff() >= 2)
                {
                    flags.curved_band = false;
                }
                // CDO
                if cats.cloud.part - cats.cloud_top.part <= 0.0
                    && cats.cloud_top.part - cats.eye.part < 1.0
                {
                    flags.curved_band = false;
                }
            }
        }
        if total >= 3.0 {
            flags.curved_band = false;
            if cats.cloud_category_diff() < 0 && cloud_temp_diff > 8.0 && f.cloud_symmetry > 30.0 {
                flags.irregular_cdo = true;
                flags.curved_band = true;
            }
        }

        let embedded_check = f.cloud_temp_c < f.cloud_top_temp_c && f.cloud_top_temp_c < f.eye_temp_c;
        if !flags.curved_band && embedded_check {
            let level = (cats.cloud_top.category + 1).min(self.calibration.bd_curve.len() - 1);
            let hits = self.spiral_hits(level);
            flags.embedded_center = (8..20).contains(&hits);
        }

        tracing::debug!(
            cloud_score = total,
            shear = flags.shear,
            irregular_cdo = flags.irregular_cdo,
            curved_band = flags.curved_band,
            black_white = flags.black_white,
            embedded_center = flags.embedded_center,
            "Evaluated cloud score"
        );

        self.flags = flags;
        if flags.shear {
            CloudState::ShearOverride
        } else if !flags.curved_band {
            CloudState::Fallback
        } else if flags.irregular_cdo {
            CloudState::IrregularCdo
        } else {
            CloudState::CurvedBandSearch
        }
    }

    fn shear_override(&mut self) -> CloudState {
        let threshold = shear_threshold(self.calibration);
        let distance = cdo::shear_distance(self.grid, self.center(), threshold);
        let missing = distance >= SHEAR_MISSING_KM;

        // A sparse band with no cold cloud anywhere is an unorganized scene
        if missing && self.flags.sparse_band {
            tracing::debug!(threshold, "No cold cloud near sparse band, using fallback");
            self.flags.shear = false;
            return CloudState::Fallback;
        }

        self.result.eye_scene = EyeScene::None;
        self.result.cloud_scene = CloudScene::Shear;
        self.result.eye_cdo_size_km = if missing {
            tracing::debug!(threshold, "Shear distance unavailable");
            MIN_SHEAR_DISTANCE_KM
        } else {
            distance.max(MIN_SHEAR_DISTANCE_KM)
        };
        CloudState::Done
    }

    fn irregular_cdo(&mut self) -> CloudState {
        self.result.eye_scene = EyeScene::None;
        self.result.cloud_scene = CloudScene::IrregularCdo;
        CloudState::Done
    }

    fn search_bands(&mut self) -> BandSearch {
        if self.flags.gray_shade {
            for level in GRAY_BAND_LEVELS {
                let hits = self.spiral_hits(level);
                if hits < 8 && level != 2 {
                    continue;
                }
                if hits > 25 {
                    if level == GRAY_BAND_LEVELS[0] {
                        // Too much cold cloud for gray shades
                        self.flags.black_white = true;
                        break;
                    }
                    return BandSearch::NotFound;
                }
                if level == 2 && hits < 7 {
                    return BandSearch::ShearLike;
                }
                return BandSearch::Found { level, hits };
            }
        }

        if self.flags.black_white {
            for level in BLACK_WHITE_BAND_LEVELS {
                let hits = self.spiral_hits(level);
                if (9..=25).contains(&hits) {
                    return BandSearch::Found { level, hits };
                }
            }
        }

        BandSearch::NotFound
    }

    fn curved_band_search(&mut self) -> CloudState {
        match self.search_bands() {
            BandSearch::Found { level, hits } => {
                let threshold = self.calibration.bd_kelvin(level);
                let point = match_spiral(
                    self.grid,
                    self.center(),
                    threshold,
                    SpiralSearch::Point,
                    self.calibration,
                );

                self.result.eye_scene = EyeScene::None;
                self.result.cloud_scene = CloudScene::CurvedBand;
                self.result.curved_band_ring = level;
                self.result.curved_band_value = hits;
                self.result.spiral_arc = point.arc;

                if self.options.allow_box_search {
                    let best = match_spiral(
                        self.grid,
                        self.center(),
                        threshold,
                        SpiralSearch::Box,
                        self.calibration,
                    );
                    self.result.max_curved_band_value = best.consecutive_hits;
                    self.result.max_curved_band_lat = best.lat;
                    self.result.max_curved_band_lon = best.lon;
                }

                tracing::debug!(level, hits, "Curved band found");
                CloudState::Done
            }
            BandSearch::ShearLike => {
                self.flags.embedded_center = false;
                if self.cats.eye.part > 1.5 || self.cats.cloud.part > 2.5 {
                    self.flags.irregular_cdo = true;
                    CloudState::Fallback
                } else {
                    self.flags.shear = true;
                    self.flags.sparse_band = true;
                    CloudState::ShearOverride
                }
            }
            BandSearch::NotFound => {
                self.flags.embedded_center = false;
                CloudState::Fallback
            }
        }
    }

    fn fallback(&mut self) -> CloudState {
        let mut cloud = CloudScene::Uniform;
        if self.flags.embedded_center {
            cloud = CloudScene::EmbeddedCenter;
        }
        if self.flags.irregular_cdo {
            cloud = CloudScene::IrregularCdo;
        }
        self.result.cloud_scene = cloud;

        if self
            .options
            .manual_eye_size()
            .is_some_and(|s| s < PINHOLE_MANUAL_SIZE_KM)
        {
            self.result.eye_scene = EyeScene::Pinhole;
        }

        let cats = &self.cats;
        let f = self.features;
        if self.eye_score > -0.25
            && self.eye_score < 1.5
            && cats.eye_cloud_category_diff() >= 2
            && f.eye_texture.harmonics <= 2
            && cats.cloud_top.part > 6.0
            && cloud.code() <= CloudScene::EmbeddedCenter.code()
            && f.cloud_texture.harmonics <= 4
            && self.ctx.t_12h >= 3.5
        {
            self.result.eye_scene = EyeScene::Pinhole;
        }

        CloudState::Done
    }

    /// Measure CDO size at several BD levels for eyeless CDO-like scenes.
    fn cdo_profile(&mut self) {
        if self.result.cloud_scene.code() > CloudScene::IrregularCdo.code()
            || self.result.eye_scene != EyeScene::None
        {
            return;
        }

        let center = self.center();
        let profile: Vec<CdoMeasurement> = CDO_PROFILE_LEVELS
            .map(|level| {
                let threshold = self.calibration.bd_kelvin(level);
                let m = cdo::measure(self.grid, center, threshold, CdoMode::CdoSize, self.calibration);
                CdoMeasurement {
                    level,
                    size_km: m.size_km,
                    asymmetry: m.asymmetry,
                }
            })
            .collect();

        if let Some(first) = profile.first() {
            self.result.eye_cdo_size_km = first.size_km;
        }
        self.result.cdo_profile = profile;
    }
}

/// Classify the eye and cloud scene of a storm.
pub fn classify(
    features: &FeatureRecord,
    grid: &StormGrid,
    history: &[HistoryRecord],
    options: &ClassifyOptions,
    calibration: &Calibration,
) -> SceneResult {
    let cats = Categories::of(features, calibration);
    let ctx = HistoryContext::from_records(
        history,
        features.image_time,
        options.over_land,
        options.prior_cycle_t,
        cats.cloud_top.part,
    );

    let eye_value = eye_score(features, &cats, &ctx);
    let mut eye_scene = if eye_value >= EYE_SCORE_THRESHOLD {
        EyeScene::Clear
    } else {
        EyeScene::None
    };

    let (rmw_km, eye_size_km) = match options.manual_eye_size() {
        Some(size) => (size, size - 1.0),
        None => {
            let est = estimate_rmw(grid, features.eye_temp_c, features.cloud_temp_c);
            if est.is_available() {
                (est.rmw_km, est.eye_size_km)
            } else {
                tracing::warn!(lat = features.lat, lon = features.lon, "RMW unavailable");
                (RMW_MISSING, 0.0)
            }
        }
    };

    if eye_scene == EyeScene::Clear && eye_size_km >= LARGE_EYE_RADIUS_KM {
        eye_scene = EyeScene::Large;
    }

    let cloud_value = cloud_score(features, &cats, &ctx, eye_scene);

    tracing::debug!(
        eye_score = eye_value,
        cloud_score = cloud_value,
        eye_part = cats.eye.part,
        cloud_part = cats.cloud.part,
        cloud_top_part = cats.cloud_top.part,
        "Computed scene scores"
    );

    let classifier = Classifier {
        features,
        grid,
        options,
        calibration,
        cats,
        ctx,
        eye_score: eye_value,
        cloud_score: cloud_value,
        flags: CloudFlags::default(),
        result: SceneResult {
            eye_scene,
            cloud_scene: CloudScene::Uniform,
            eye_cdo_size_km: eye_size_km,
            curved_band_ring: 0,
            curved_band_value: 0,
            max_curved_band_value: 0,
            max_curved_band_lat: features.lat,
            max_curved_band_lon: features.lon,
            rmw_km,
            eye_score: eye_value,
            cloud_score: cloud_value,
            cdo_profile: Vec::new(),
            spiral_arc: Vec::new(),
        },
    };

    let result = classifier.run();
    tracing::debug!(
        eye_scene = %result.eye_scene,
        cloud_scene = %result.cloud_scene,
        size_km = result.eye_cdo_size_km,
        "Classified scene"
    );
    result
}
