//! Prior analysis cycles supplied by the caller.

use crate::scene::{CloudScene, EyeScene};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One previously completed analysis cycle.
///
/// Histories are passed as slices ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Image time of the cycle
    pub time: NaiveDateTime,
    /// Final T-number
    pub final_t: f32,
    /// Raw T-number; values below 1.0 mark an unusable cycle
    pub raw_t: f32,
    pub eye_scene: EyeScene,
    pub cloud_scene: CloudScene,
    /// Storm center was over land
    pub over_land: bool,
    /// Rule 9 (weakening constraint) was active
    pub rule9: bool,
}

impl HistoryRecord {
    /// A usable over-water record, the common case in tests and replays.
    pub fn new(
        time: NaiveDateTime,
        final_t: f32,
        eye_scene: EyeScene,
        cloud_scene: CloudScene,
    ) -> Self {
        Self {
            time,
            final_t,
            raw_t: final_t,
            eye_scene,
            cloud_scene,
            over_land: false,
            rule9: false,
        }
    }
}
