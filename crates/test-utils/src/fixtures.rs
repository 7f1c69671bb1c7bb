//! Common fixtures for scene analysis tests.

use adt_common::{CloudScene, EyeScene, HistoryRecord};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Reference image time used across tests (2024-09-10 12:00).
pub fn reference_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 10)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid reference time")
}

/// A history of a strengthening storm with an eye in the latest cycles.
///
/// Records are three hours apart and end three hours before
/// [`reference_time`].
pub fn strengthening_eye_history() -> Vec<HistoryRecord> {
    let scenes = [
        (4.0, EyeScene::None, CloudScene::Uniform),
        (4.5, EyeScene::None, CloudScene::EmbeddedCenter),
        (5.0, EyeScene::Clear, CloudScene::Uniform),
        (5.5, EyeScene::Clear, CloudScene::Uniform),
    ];
    let start = reference_time() - Duration::hours(3 * scenes.len() as i64);

    scenes
        .iter()
        .enumerate()
        .map(|(i, &(t, eye, cloud))| {
            HistoryRecord::new(start + Duration::hours(3 * i as i64), t, eye, cloud)
        })
        .collect()
}

/// A history of a weak sheared system.
pub fn weak_shear_history() -> Vec<HistoryRecord> {
    let start = reference_time() - Duration::hours(9);
    (0..3)
        .map(|i| {
            let mut rec = HistoryRecord::new(
                start + Duration::hours(3 * i),
                2.0,
                EyeScene::None,
                CloudScene::Shear,
            );
            rec.rule9 = true;
            rec
        })
        .collect()
}
