use std::path::PathBuf;

/// One rendered DICOM element for the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub tag: String,
    pub vr: String,
    pub alias: String,
    pub value: String,
}

/// A single image. Built by the loader, never mutated afterwards.
///
/// `file_path` is the opaque reference the preview pipeline uses to fetch
/// pixel data; nothing in the navigation layer reads the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub sop_instance_uid: String,
    /// Not necessarily contiguous or starting at 1.
    pub instance_number: i32,
    pub file_path: PathBuf,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub metadata: Vec<MetadataRow>,
}

/// An acquisition run within a study.
///
/// Invariant: `instances` is non-empty and ordered by `instance_number`.
/// The loader never hands out an empty series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub series_instance_uid: String,
    pub series_number: i32,
    pub description: String,
    pub modality: String,
    pub instances: Vec<Instance>,
}

/// One patient imaging encounter.
///
/// Patient fields are pass-through from the parsed files; this layer never
/// synthesizes them. Invariant: `series` is non-empty, ordered by
/// `series_number`.
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    pub study_instance_uid: String,
    pub patient_name: String,
    pub patient_id: String,
    pub study_date: String,
    pub description: String,
    pub series: Vec<Series>,
}
