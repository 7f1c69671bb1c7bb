//! Persistence terms derived from prior analysis cycles.

use adt_common::{CloudScene, EyeScene, HistoryRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Window for the "12 hours ago" intensity lookup (days).
const LOOKBACK_DAYS: f64 = 0.5;

/// T-number decay per day of unusable records.
const DECAY_PER_DAY: f32 = 1.0;

/// Raw T-numbers below this mark a record as unusable.
const MIN_RAW_T: f32 = 1.0;

/// Placeholder intensity before any record is seen.
const NO_T: f32 = -99.0;

/// Summary of the storm's recent history as seen by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryContext {
    /// A usable record was found within the lookback window
    pub found_at_12h: bool,
    /// Final T-number about 12 hours ago
    pub t_12h: f32,
    /// Final T-number of the latest usable record
    pub last_t: f32,
    /// Highest final T-number seen
    pub max_t: f32,
    /// Eye scene of the latest usable record. `None` before any usable
    /// record, which the eye score treats like an eye.
    pub last_eye_scene: Option<EyeScene>,
    pub last_cloud_scene: CloudScene,
    pub last_rule9: bool,
    /// An eye was seen and has not been lost to shear or land since
    pub found_eye: bool,
}

impl HistoryContext {
    /// Context used when no history is available.
    ///
    /// `prior_t` is the caller's starting T-number and `cloud_top_part` the
    /// BD part of the current cloud-top temperature.
    pub fn initial(prior_t: f32, cloud_top_part: f32) -> Self {
        let (last_cloud_scene, t_12h) = if cloud_top_part < 3.5 && prior_t < 3.5 {
            (CloudScene::CurvedBand, prior_t)
        } else {
            (CloudScene::Uniform, prior_t.max(4.0))
        };

        Self {
            found_at_12h: true,
            t_12h,
            last_t: NO_T,
            max_t: NO_T,
            last_eye_scene: Some(EyeScene::None),
            last_cloud_scene,
            last_rule9: true,
            found_eye: false,
        }
    }

    /// Build the context from history records ordered oldest first.
    ///
    /// Records at or after `current_time`, over land while the current
    /// image is over land, or with a raw T-number below 1.0 are skipped.
    /// Falls back to [`HistoryContext::initial`] when there are no records
    /// or no image time.
    pub fn from_records(
        records: &[HistoryRecord],
        current_time: Option<NaiveDateTime>,
        over_land: bool,
        prior_t: f32,
        cloud_top_part: f32,
    ) -> Self {
        let current = match current_time {
            Some(t) if !records.is_empty() => t,
            _ => return Self::initial(prior_t, cloud_top_part),
        };

        let mut ctx = Self {
            found_at_12h: false,
            t_12h: NO_T,
            last_t: NO_T,
            max_t: NO_T,
            last_eye_scene: None,
            last_cloud_scene: CloudScene::CurvedBand,
            last_rule9: false,
            found_eye: false,
        };
        let mut last_valid: Option<(NaiveDateTime, f32)> = None;

        for rec in records {
            let usable = !(over_land && rec.over_land) && rec.raw_t >= MIN_RAW_T;
            let age_days = days_between(rec.time, current);

            if rec.time < current && usable {
                if age_days <= LOOKBACK_DAYS && !ctx.found_at_12h {
                    ctx.t_12h = rec.final_t;
                    ctx.found_at_12h = true;
                }
                ctx.last_t = rec.final_t;
                ctx.last_cloud_scene = rec.cloud_scene;
                ctx.last_eye_scene = Some(rec.eye_scene);
                if rec.eye_scene.has_eye() {
                    ctx.found_eye = true;
                }
                if rec.cloud_scene == CloudScene::Shear && rec.eye_scene == EyeScene::None {
                    ctx.found_eye = false;
                }
                ctx.last_rule9 = rec.rule9;
                ctx.max_t = ctx.max_t.max(rec.final_t);
                last_valid = Some((rec.time, rec.final_t));
            } else if !usable {
                match last_valid {
                    Some((time, t)) => {
                        let gap = days_between(time, rec.time);
                        if gap > LOOKBACK_DAYS {
                            ctx.found_eye = false;
                            ctx.last_t = t - DECAY_PER_DAY * gap as f32;
                        }
                    }
                    None => ctx.found_eye = false,
                }
            }
        }

        if !ctx.found_at_12h {
            ctx.t_12h = ctx.last_t;
        }

        tracing::debug!(
            records = records.len(),
            found_at_12h = ctx.found_at_12h,
            t_12h = ctx.t_12h,
            last_t = ctx.last_t,
            found_eye = ctx.found_eye,
            "Derived history context"
        );

        ctx
    }
}

fn days_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_seconds() as f64 / 86_400.0
}
