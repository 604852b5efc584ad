//! Recently viewed studies, persisted as a JSON file between sessions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const MAX_ENTRIES: usize = 20;

/// Where a previously viewed study came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudySource {
    /// A plain folder path (desktop-style persistent reference).
    Folder(PathBuf),
    /// A persisted directory-handle id resolved through a `HandleStore`
    /// (web-style capability reference carried over from older sessions).
    Saved { handle_id: String },
}

/// One history entry; enough to show a list row and to resolve the study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentStudy {
    pub study_instance_uid: String,
    pub patient_name: String,
    pub description: String,
    pub study_date: String,
    pub source: StudySource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyHistory {
    entries: Vec<RecentStudy>,
}

impl StudyHistory {
    pub fn entries(&self) -> &[RecentStudy] {
        &self.entries
    }

    /// Inserts (or moves) an entry at the front; one entry per study UID,
    /// capped at `MAX_ENTRIES`.
    pub fn record(&mut self, entry: RecentStudy) {
        self.entries
            .retain(|existing| existing.study_instance_uid != entry.study_instance_uid);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Loads the history file; a missing or unreadable file yields an empty
    /// history rather than an error.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(history) => history,
                Err(err) => {
                    log::warn!("Ignoring malformed history file {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persists the history; failures are logged and otherwise ignored (the
    /// session keeps working without a history file).
    pub fn save(&self, path: &Path) {
        let serialized = match serde_json::to_string_pretty(self) {
            Ok(serialized) => serialized,
            Err(err) => {
                log::warn!("Failed to serialize study history: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(path, serialized) {
            log::warn!("Failed to write history file {}: {err}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(uid: &str) -> RecentStudy {
        RecentStudy {
            study_instance_uid: uid.to_string(),
            patient_name: format!("Patient {uid}"),
            description: String::new(),
            study_date: "20240101".to_string(),
            source: StudySource::Folder(PathBuf::from(format!("/data/{uid}"))),
        }
    }

    #[test]
    fn record_keeps_most_recent_first_and_dedups_by_uid() {
        let mut history = StudyHistory::default();
        history.record(entry("A"));
        history.record(entry("B"));
        history.record(entry("A"));

        let uids: Vec<&str> = history
            .entries()
            .iter()
            .map(|e| e.study_instance_uid.as_str())
            .collect();
        assert_eq!(uids, vec!["A", "B"]);
    }

    #[test]
    fn record_caps_the_entry_count() {
        let mut history = StudyHistory::default();
        for idx in 0..(MAX_ENTRIES + 5) {
            history.record(entry(&format!("uid-{idx}")));
        }
        assert_eq!(history.entries().len(), MAX_ENTRIES);
        assert_eq!(
            history.entries()[0].study_instance_uid,
            format!("uid-{}", MAX_ENTRIES + 4)
        );
    }

    #[test]
    fn history_round_trips_through_the_json_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("history.json");

        let mut history = StudyHistory::default();
        history.record(entry("A"));
        history.record(RecentStudy {
            source: StudySource::Saved {
                handle_id: "handle-1".to_string(),
            },
            ..entry("B")
        });
        history.save(&path);

        let reloaded = StudyHistory::load(&path);
        assert_eq!(reloaded.entries(), history.entries());
    }

    #[test]
    fn missing_or_malformed_files_yield_an_empty_history() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("nope.json");
        assert!(StudyHistory::load(&missing).entries().is_empty());

        let malformed = dir.path().join("bad.json");
        std::fs::write(&malformed, "{not json").expect("write");
        assert!(StudyHistory::load(&malformed).entries().is_empty());
    }
}
