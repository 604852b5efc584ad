//! Pure selection arithmetic over the study/series/instance hierarchy.
//!
//! Selecting a coarser entity resets everything beneath it to its first
//! child; selecting a finer entity never perturbs coarser selection;
//! selecting a series may switch the owning study. Each navigation entry
//! point in the session goes through these helpers so the reset rules live
//! in exactly one place.

use crate::model::entities::{Series, Study};

/// Position of the current study/series/instance triple.
///
/// A `Selection` only exists as a complete triple; a session either has a
/// full selection or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub study: usize,
    pub series: usize,
    pub instance: usize,
}

impl Selection {
    /// Enters a study: first series, first instance.
    pub fn from_study(study: usize) -> Self {
        Self {
            study,
            series: 0,
            instance: 0,
        }
    }

    /// Enters a series: the instance cursor resets to the first instance.
    pub fn from_series(study: usize, series: usize) -> Self {
        Self {
            study,
            series,
            instance: 0,
        }
    }
}

/// Clamps a requested instance position into `[0, len - 1]`.
pub fn clamp_instance(series: &Series, requested: i64) -> usize {
    debug_assert!(
        !series.instances.is_empty(),
        "series {} reached the navigator without instances",
        series.series_instance_uid
    );
    let last = series.instances.len().saturating_sub(1);
    if requested < 0 {
        0
    } else {
        (requested as usize).min(last)
    }
}

/// First study in load order with the given UID. Duplicate UIDs are
/// tolerated; the first match wins.
pub fn find_study(studies: &[Study], uid: &str) -> Option<usize> {
    studies
        .iter()
        .position(|study| study.study_instance_uid == uid)
}

/// Cross-study series lookup.
///
/// The preferred (usually current) study is searched first; after that every
/// study is scanned in load order. First match wins.
pub fn find_series(
    studies: &[Study],
    preferred_study: Option<usize>,
    uid: &str,
) -> Option<(usize, usize)> {
    if let Some(study_idx) = preferred_study {
        if let Some(study) = studies.get(study_idx) {
            if let Some(series_idx) = series_position(study, uid) {
                return Some((study_idx, series_idx));
            }
        }
    }

    studies.iter().enumerate().find_map(|(study_idx, study)| {
        series_position(study, uid).map(|series_idx| (study_idx, series_idx))
    })
}

fn series_position(study: &Study, uid: &str) -> Option<usize> {
    study
        .series
        .iter()
        .position(|series| series.series_instance_uid == uid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{series, study};

    #[test]
    fn from_study_selects_first_children() {
        let selection = Selection::from_study(3);
        assert_eq!(
            selection,
            Selection {
                study: 3,
                series: 0,
                instance: 0
            }
        );
    }

    #[test]
    fn from_series_resets_only_the_instance_cursor() {
        let selection = Selection::from_series(1, 2);
        assert_eq!(
            selection,
            Selection {
                study: 1,
                series: 2,
                instance: 0
            }
        );
    }

    #[test]
    fn clamp_handles_negative_and_overlarge_requests() {
        let series = series("1.2.3", 1, 5);
        assert_eq!(clamp_instance(&series, -1), 0);
        assert_eq!(clamp_instance(&series, -999), 0);
        assert_eq!(clamp_instance(&series, 0), 0);
        assert_eq!(clamp_instance(&series, 4), 4);
        assert_eq!(clamp_instance(&series, 5), 4);
        assert_eq!(clamp_instance(&series, i64::MAX), 4);
    }

    #[test]
    fn find_study_returns_first_match_in_load_order() {
        let studies = vec![study("A", 1, 1), study("B", 1, 1), study("B", 2, 2)];
        assert_eq!(find_study(&studies, "A"), Some(0));
        assert_eq!(find_study(&studies, "B"), Some(1));
        assert_eq!(find_study(&studies, "C"), None);
    }

    #[test]
    fn find_series_prefers_the_current_study() {
        // Both studies carry a series with the same UID; the preferred study
        // must win even though the other one comes first in load order.
        let mut first = study("A", 1, 1);
        let mut second = study("B", 1, 1);
        first.series.push(series("shared", 2, 1));
        second.series.push(series("shared", 2, 1));
        let studies = vec![first, second];

        assert_eq!(find_series(&studies, Some(1), "shared"), Some((1, 1)));
        assert_eq!(find_series(&studies, Some(0), "shared"), Some((0, 1)));
        assert_eq!(find_series(&studies, None, "shared"), Some((0, 1)));
    }

    #[test]
    fn find_series_scans_other_studies_when_needed() {
        let studies = vec![study("A", 2, 1), study("B", 2, 1)];
        let target = studies[1].series[1].series_instance_uid.clone();

        assert_eq!(find_series(&studies, Some(0), &target), Some((1, 1)));
        assert_eq!(find_series(&studies, Some(0), "missing"), None);
    }
}
