//! Reopening a previously viewed study by the cheapest valid path:
//! already loaded → content cache → cold reload from disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::cascade::find_study;
use crate::model::entities::Study;
use crate::model::error::ResolveError;
use crate::model::history::{RecentStudy, StudySource};
use crate::model::loader::LoadReport;
use crate::model::session::StudySession;

/// Synchronous content cache keyed by folder path or handle id.
pub trait StudyCache {
    fn get(&self, key: &str) -> Option<Vec<Study>>;
    fn put(&mut self, key: &str, studies: Vec<Study>);
}

/// Persistent directory-handle storage.
///
/// On desktop a "handle" resolves to a plain path; the probes stand in for
/// the capability/permission checks a sandboxed platform would run.
pub trait HandleStore {
    fn resolve(&self, handle_id: &str) -> Option<PathBuf>;
    fn exists(&self, path: &Path) -> bool;
    fn is_readable(&self, path: &Path) -> bool;
}

/// Outcome of the synchronous part of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The engine already held the study; it is now current.
    AlreadyLoaded,
    /// The cache supplied the collection; it is now loaded and current.
    FromCache,
    /// The caller must run a cold reload of `path` and feed the result back
    /// through [`apply_reload`] with the given cache key.
    Reload { path: PathBuf, cache_key: String },
}

/// Cache key for a study source: the folder path, or a tagged handle id.
pub fn cache_key(source: &StudySource) -> String {
    match source {
        StudySource::Folder(path) => path.display().to_string(),
        StudySource::Saved { handle_id } => format!("handle:{handle_id}"),
    }
}

/// Decides how to make `entry`'s study current and applies the synchronous
/// paths directly.
///
/// The cold-reload path only validates the target here (missing handles,
/// vanished folders, revoked access are reported, never retried); the actual
/// file I/O is the caller's job.
pub fn resolve(
    entry: &RecentStudy,
    session: &mut StudySession,
    cache: &impl StudyCache,
    handles: &impl HandleStore,
) -> Result<Resolution, ResolveError> {
    if find_study(session.studies(), &entry.study_instance_uid).is_some() {
        log::debug!("resolver: study {} already loaded", entry.study_instance_uid);
        session.set_current_study(&entry.study_instance_uid);
        return Ok(Resolution::AlreadyLoaded);
    }

    let key = cache_key(&entry.source);
    if let Some(studies) = cache.get(&key) {
        log::debug!("resolver: cache hit for {key}");
        session.set_studies(studies);
        // A silent miss here leaves the cascade default (first study) in
        // place, which is the intended fallback.
        session.set_current_study(&entry.study_instance_uid);
        return Ok(Resolution::FromCache);
    }

    let path = match &entry.source {
        StudySource::Folder(path) => path.clone(),
        StudySource::Saved { handle_id } => {
            handles
                .resolve(handle_id)
                .ok_or_else(|| ResolveError::HandleMissing {
                    handle_id: handle_id.clone(),
                    study_uid: entry.study_instance_uid.clone(),
                })?
        }
    };

    if !handles.exists(&path) {
        return Err(ResolveError::FolderMissing { path });
    }
    if !handles.is_readable(&path) {
        return Err(ResolveError::PermissionDenied { path });
    }

    Ok(Resolution::Reload {
        path,
        cache_key: key,
    })
}

/// Feeds a finished cold reload back into the session and the cache.
pub fn apply_reload(
    session: &mut StudySession,
    cache: &mut impl StudyCache,
    study_uid: &str,
    key: &str,
    path: &Path,
    report: LoadReport,
) -> Result<(), ResolveError> {
    for failure in &report.failures {
        log::warn!("resolver: skipped file during reload: {failure}");
    }
    if report.studies.is_empty() {
        return Err(ResolveError::NoStudiesFound {
            path: path.to_path_buf(),
        });
    }

    cache.put(key, report.studies.clone());
    session.set_studies(report.studies);
    session.set_current_study(study_uid);
    Ok(())
}

/// In-memory cache used by the application (and dropped with it).
#[derive(Debug, Default)]
pub struct MemoryStudyCache {
    collections: HashMap<String, Vec<Study>>,
}

impl StudyCache for MemoryStudyCache {
    fn get(&self, key: &str) -> Option<Vec<Study>> {
        self.collections.get(key).cloned()
    }

    fn put(&mut self, key: &str, studies: Vec<Study>) {
        self.collections.insert(key.to_string(), studies);
    }
}

/// Handle store persisted as a JSON map of handle id → folder path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedHandleStore {
    handles: HashMap<String, PathBuf>,
}

impl SavedHandleStore {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed handle file {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(serialized) => {
                if let Err(err) = std::fs::write(path, serialized) {
                    log::warn!("Failed to write handle file {}: {err}", path.display());
                }
            }
            Err(err) => log::warn!("Failed to serialize handle store: {err}"),
        }
    }

    pub fn register(&mut self, handle_id: &str, path: PathBuf) {
        self.handles.insert(handle_id.to_string(), path);
    }
}

impl HandleStore for SavedHandleStore {
    fn resolve(&self, handle_id: &str) -> Option<PathBuf> {
        self.handles.get(handle_id).cloned()
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_readable(&self, path: &Path) -> bool {
        std::fs::read_dir(path).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::study;

    fn entry(uid: &str, source: StudySource) -> RecentStudy {
        RecentStudy {
            study_instance_uid: uid.to_string(),
            patient_name: format!("Patient {uid}"),
            description: String::new(),
            study_date: "20240101".to_string(),
            source,
        }
    }

    fn folder_entry(uid: &str, path: &str) -> RecentStudy {
        entry(uid, StudySource::Folder(PathBuf::from(path)))
    }

    #[derive(Default)]
    struct MockCache {
        collections: HashMap<String, Vec<Study>>,
    }

    impl StudyCache for MockCache {
        fn get(&self, key: &str) -> Option<Vec<Study>> {
            self.collections.get(key).cloned()
        }

        fn put(&mut self, key: &str, studies: Vec<Study>) {
            self.collections.insert(key.to_string(), studies);
        }
    }

    /// Pretends every known path exists and is readable.
    #[derive(Default)]
    struct MockHandles {
        handles: HashMap<String, PathBuf>,
        unreadable: Vec<PathBuf>,
        missing: Vec<PathBuf>,
    }

    impl HandleStore for MockHandles {
        fn resolve(&self, handle_id: &str) -> Option<PathBuf> {
            self.handles.get(handle_id).cloned()
        }

        fn exists(&self, path: &Path) -> bool {
            !self.missing.iter().any(|p| p == path)
        }

        fn is_readable(&self, path: &Path) -> bool {
            !self.unreadable.iter().any(|p| p == path)
        }
    }

    #[test]
    fn already_loaded_studies_are_selected_directly() {
        let mut session = StudySession::new();
        session.set_studies(vec![study("A", 1, 1), study("B", 1, 1)]);

        let resolution = resolve(
            &folder_entry("B", "/data/b"),
            &mut session,
            &MockCache::default(),
            &MockHandles::default(),
        )
        .expect("resolve");

        assert_eq!(resolution, Resolution::AlreadyLoaded);
        assert_eq!(session.current_study().unwrap().study_instance_uid, "B");
    }

    #[test]
    fn cache_hits_load_the_collection_and_select_the_target() {
        let mut cache = MockCache::default();
        cache.put("/data/b", vec![study("X", 1, 1), study("B", 1, 1)]);
        let mut session = StudySession::new();

        let resolution = resolve(
            &folder_entry("B", "/data/b"),
            &mut session,
            &cache,
            &MockHandles::default(),
        )
        .expect("resolve");

        assert_eq!(resolution, Resolution::FromCache);
        assert_eq!(session.studies().len(), 2);
        assert_eq!(session.current_study().unwrap().study_instance_uid, "B");
    }

    #[test]
    fn cache_hit_without_the_target_uid_keeps_the_first_study() {
        let mut cache = MockCache::default();
        cache.put("/data/b", vec![study("X", 1, 1)]);
        let mut session = StudySession::new();

        let resolution = resolve(
            &folder_entry("gone", "/data/b"),
            &mut session,
            &cache,
            &MockHandles::default(),
        )
        .expect("resolve");

        assert_eq!(resolution, Resolution::FromCache);
        assert_eq!(session.current_study().unwrap().study_instance_uid, "X");
    }

    #[test]
    fn cold_reload_is_requested_for_a_readable_folder() {
        let mut session = StudySession::new();

        let resolution = resolve(
            &folder_entry("B", "/data/b"),
            &mut session,
            &MockCache::default(),
            &MockHandles::default(),
        )
        .expect("resolve");

        assert_eq!(
            resolution,
            Resolution::Reload {
                path: PathBuf::from("/data/b"),
                cache_key: "/data/b".to_string(),
            }
        );
        assert!(session.studies().is_empty());
    }

    #[test]
    fn saved_handles_resolve_through_the_store() {
        let mut handles = MockHandles::default();
        handles
            .handles
            .insert("h1".to_string(), PathBuf::from("/vault/b"));
        let mut session = StudySession::new();

        let resolution = resolve(
            &entry(
                "B",
                StudySource::Saved {
                    handle_id: "h1".to_string(),
                },
            ),
            &mut session,
            &MockCache::default(),
            &handles,
        )
        .expect("resolve");

        assert_eq!(
            resolution,
            Resolution::Reload {
                path: PathBuf::from("/vault/b"),
                cache_key: "handle:h1".to_string(),
            }
        );
    }

    #[test]
    fn missing_handles_and_folders_are_reported() {
        let mut session = StudySession::new();

        let err = resolve(
            &entry(
                "B",
                StudySource::Saved {
                    handle_id: "gone".to_string(),
                },
            ),
            &mut session,
            &MockCache::default(),
            &MockHandles::default(),
        )
        .expect_err("missing handle");
        assert!(matches!(err, ResolveError::HandleMissing { .. }));

        let mut handles = MockHandles::default();
        handles.missing.push(PathBuf::from("/data/b"));
        let err = resolve(
            &folder_entry("B", "/data/b"),
            &mut session,
            &MockCache::default(),
            &handles,
        )
        .expect_err("missing folder");
        assert!(matches!(err, ResolveError::FolderMissing { .. }));

        let mut handles = MockHandles::default();
        handles.unreadable.push(PathBuf::from("/data/b"));
        let err = resolve(
            &folder_entry("B", "/data/b"),
            &mut session,
            &MockCache::default(),
            &handles,
        )
        .expect_err("unreadable folder");
        assert!(matches!(err, ResolveError::PermissionDenied { .. }));
    }

    #[test]
    fn apply_reload_populates_cache_and_selects_the_target() {
        let mut session = StudySession::new();
        let mut cache = MockCache::default();
        let report = LoadReport {
            studies: vec![study("X", 1, 1), study("B", 2, 2)],
            failures: vec!["/data/b/broken.dcm: truncated".to_string()],
        };

        apply_reload(
            &mut session,
            &mut cache,
            "B",
            "/data/b",
            Path::new("/data/b"),
            report,
        )
        .expect("apply");

        assert_eq!(session.current_study().unwrap().study_instance_uid, "B");
        assert_eq!(cache.get("/data/b").unwrap().len(), 2);
    }

    #[test]
    fn saved_handle_store_round_trips_and_probes_real_folders() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let store_path = dir.path().join("handles.json");

        let mut store = SavedHandleStore::default();
        store.register("h1", dir.path().to_path_buf());
        store.save(&store_path);

        let reloaded = SavedHandleStore::load(&store_path);
        assert_eq!(reloaded.resolve("h1"), Some(dir.path().to_path_buf()));
        assert_eq!(reloaded.resolve("unknown"), None);
        assert!(reloaded.exists(dir.path()));
        assert!(reloaded.is_readable(dir.path()));
        assert!(!reloaded.exists(&dir.path().join("gone")));
    }

    #[test]
    fn apply_reload_of_an_empty_folder_is_an_error() {
        let mut session = StudySession::new();
        let mut cache = MockCache::default();

        let err = apply_reload(
            &mut session,
            &mut cache,
            "B",
            "/data/b",
            Path::new("/data/b"),
            LoadReport::default(),
        )
        .expect_err("empty reload");

        assert!(matches!(err, ResolveError::NoStudiesFound { .. }));
        assert!(cache.get("/data/b").is_none());
        assert!(session.studies().is_empty());
    }
}
