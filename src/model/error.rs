use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading DICOM files from disk.
///
/// Per-file parse problems are not represented here: the loader logs and
/// skips unreadable files so one bad file cannot sink a whole folder.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: failed to open DICOM file ({detail})")]
    OpenFile { path: PathBuf, detail: String },
}

/// Failures raised while reopening a previously viewed study.
///
/// Unlike navigation misses, these are surfaced to the user: they represent
/// a genuine inability to satisfy the request.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no saved folder reference `{handle_id}` for study {study_uid}")]
    HandleMissing { handle_id: String, study_uid: String },

    #[error("study folder no longer exists: {path}")]
    FolderMissing { path: PathBuf },

    #[error("access to study folder was denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("no DICOM studies found under {path}")]
    NoStudiesFound { path: PathBuf },

    #[error("failed to reload study from {path}: {source}")]
    Reload {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}
