//! The navigation engine: loaded studies plus the current selection cursor.
//!
//! `StudySession` is an explicitly constructed value owned by the
//! application; tests build as many independent sessions as they like. All
//! mutation of the loaded hierarchy goes through the operations here, and
//! every operation completes synchronously, so callers never observe a
//! half-applied selection.

use crate::model::cascade::{clamp_instance, find_series, find_study, Selection};
use crate::model::entities::{Instance, Series, Study};

/// In-memory session state for the viewer.
///
/// Either nothing is selected, or a full study/series/instance triple is
/// selected; there is no reachable partially-selected state.
#[derive(Debug, Default)]
pub struct StudySession {
    studies: Vec<Study>,
    selection: Option<Selection>,
    is_loading: bool,
    error: Option<String>,
}

impl StudySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn studies(&self) -> &[Study] {
        &self.studies
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn current_study(&self) -> Option<&Study> {
        self.selection
            .and_then(|selection| self.studies.get(selection.study))
    }

    pub fn current_series(&self) -> Option<&Series> {
        self.selection.and_then(|selection| {
            self.studies
                .get(selection.study)
                .and_then(|study| study.series.get(selection.series))
        })
    }

    pub fn current_instance(&self) -> Option<&Instance> {
        self.selection.and_then(|selection| {
            self.current_series()
                .and_then(|series| series.instances.get(selection.instance))
        })
    }

    /// Zero-based cursor within the current series; reads 0 when nothing is
    /// selected.
    pub fn current_instance_index(&self) -> usize {
        self.selection.map_or(0, |selection| selection.instance)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the loaded studies wholesale.
    ///
    /// A non-empty collection selects the first study with the full cascade;
    /// an empty one clears the selection entirely.
    pub fn set_studies(&mut self, studies: Vec<Study>) {
        log::debug!("session: replacing studies ({} loaded)", studies.len());
        self.studies = studies;
        self.selection = if self.studies.is_empty() {
            None
        } else {
            Some(Selection::from_study(0))
        };
    }

    /// Appends a study without touching the selection, even when the session
    /// was empty. Incremental loads must not move a user who is already
    /// viewing something; callers select explicitly if they want to.
    pub fn add_study(&mut self, study: Study) {
        log::debug!("session: adding study {}", study.study_instance_uid);
        self.studies.push(study);
    }

    /// Selects a study by UID (first match in load order).
    ///
    /// An unknown UID is a silent no-op. A known UID (including the one
    /// already current) applies the full cascade, so re-entering a study
    /// behaves exactly like entering it fresh.
    pub fn set_current_study(&mut self, uid: &str) {
        match find_study(&self.studies, uid) {
            Some(study_idx) => self.selection = Some(Selection::from_study(study_idx)),
            None => log::debug!("session: ignoring unknown study {uid}"),
        }
    }

    /// Selects a series by UID, searching the current study first and then
    /// every loaded study in order.
    ///
    /// A match in another study switches the current study implicitly. The
    /// instance cursor always resets to the first instance. An unknown UID
    /// is a silent no-op.
    pub fn set_current_series(&mut self, uid: &str) {
        let preferred = self.selection.map(|selection| selection.study);
        match find_series(&self.studies, preferred, uid) {
            Some((study_idx, series_idx)) => {
                if preferred.is_some() && preferred != Some(study_idx) {
                    log::debug!("session: series {uid} switches study to index {study_idx}");
                }
                self.selection = Some(Selection::from_series(study_idx, series_idx));
            }
            None => log::debug!("session: ignoring unknown series {uid}"),
        }
    }

    /// Moves the instance cursor within the current series, clamping the
    /// request into bounds. Without a current series this is a no-op.
    pub fn set_current_instance(&mut self, index: i64) {
        let Some(mut selection) = self.selection else {
            return;
        };
        let Some(series) = self.current_series() else {
            return;
        };
        selection.instance = clamp_instance(series, index);
        self.selection = Some(selection);
    }

    /// Steps forward one instance, saturating at the end of the series.
    pub fn next_instance(&mut self) {
        if let Some(selection) = self.selection {
            self.set_current_instance(selection.instance as i64 + 1);
        }
    }

    /// Steps back one instance, saturating at the start of the series.
    pub fn previous_instance(&mut self) {
        if let Some(selection) = self.selection {
            self.set_current_instance(selection.instance as i64 - 1);
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        if let Some(message) = &error {
            log::warn!("session: {message}");
        }
        self.error = error;
    }

    /// Restores the freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
