//! Reads DICOM files from disk and groups them into the study hierarchy.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use dicom::object::{open_file, DefaultDicomObject};

use crate::model::entities::{Instance, MetadataRow, Series, Study};
use crate::model::error::LoadError;
use crate::utils::element_rows;

/// Flat per-file extraction result, before grouping.
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    pub study_instance_uid: String,
    pub patient_name: String,
    pub patient_id: String,
    pub study_date: String,
    pub study_description: String,
    pub series_instance_uid: String,
    pub series_number: i32,
    pub series_description: String,
    pub modality: String,
    pub sop_instance_uid: String,
    pub instance_number: i32,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub file_path: PathBuf,
    pub metadata: Vec<MetadataRow>,
}

/// Result of a multi-file load. An empty `studies` with no `failures` is a
/// valid outcome (nothing importable was found), not an error.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub studies: Vec<Study>,
    pub failures: Vec<String>,
}

pub fn read_instance(path: PathBuf) -> Result<InstanceRecord, LoadError> {
    log::info!("Reading DICOM file: {}", path.display());
    let object = open_file(&path).map_err(|err| {
        log::error!("{}: failed to open DICOM file ({err})", path.display());
        LoadError::OpenFile {
            path: path.clone(),
            detail: err.to_string(),
        }
    })?;

    let metadata = element_rows(&object);

    Ok(InstanceRecord {
        study_instance_uid: attribute_or_unknown(&object, "StudyInstanceUID"),
        patient_name: attribute_or_unknown(&object, "PatientName"),
        patient_id: attribute_or_unknown(&object, "PatientID"),
        study_date: attribute_text(&object, "StudyDate").unwrap_or_default(),
        study_description: attribute_text(&object, "StudyDescription").unwrap_or_default(),
        series_instance_uid: attribute_or_unknown(&object, "SeriesInstanceUID"),
        series_number: attribute_number(&object, "SeriesNumber").unwrap_or(0),
        series_description: attribute_text(&object, "SeriesDescription").unwrap_or_default(),
        modality: attribute_or_unknown(&object, "Modality"),
        sop_instance_uid: attribute_or_unknown(&object, "SOPInstanceUID"),
        instance_number: attribute_number(&object, "InstanceNumber").unwrap_or(0),
        rows: attribute_number(&object, "Rows"),
        columns: attribute_number(&object, "Columns"),
        file_path: path,
        metadata,
    })
}

/// Recursively lists candidate DICOM files under `dir`, sorted by path.
pub fn scan_dicom_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_candidates(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_candidates(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|source| LoadError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if is_hidden(&path) {
            continue;
        }
        if path.is_dir() {
            collect_candidates(&path, out)?;
        } else if is_dicom_candidate(&path) {
            out.push(path);
        }
    }

    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Accepts `.dcm`/`.dicom` (any case) and extensionless files; many archives
/// ship instances with bare numeric names.
fn is_dicom_candidate(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom"),
    }
}

/// Groups flat records into the study → series → instance hierarchy.
///
/// Studies and series keep first-seen order per UID before series are sorted
/// by `series_number` and instances by `instance_number` (stable, so ties
/// keep arrival order). Never constructs an empty study or series.
pub fn group_records(records: Vec<InstanceRecord>) -> Vec<Study> {
    let mut studies: Vec<Study> = Vec::new();

    for record in records {
        let study_idx = match studies
            .iter()
            .position(|study| study.study_instance_uid == record.study_instance_uid)
        {
            Some(idx) => idx,
            None => {
                studies.push(Study {
                    study_instance_uid: record.study_instance_uid.clone(),
                    patient_name: record.patient_name.clone(),
                    patient_id: record.patient_id.clone(),
                    study_date: record.study_date.clone(),
                    description: record.study_description.clone(),
                    series: Vec::new(),
                });
                studies.len() - 1
            }
        };

        let study = &mut studies[study_idx];
        let series_idx = match study
            .series
            .iter()
            .position(|series| series.series_instance_uid == record.series_instance_uid)
        {
            Some(idx) => idx,
            None => {
                study.series.push(Series {
                    series_instance_uid: record.series_instance_uid.clone(),
                    series_number: record.series_number,
                    description: record.series_description.clone(),
                    modality: record.modality.clone(),
                    instances: Vec::new(),
                });
                study.series.len() - 1
            }
        };

        study.series[series_idx].instances.push(Instance {
            sop_instance_uid: record.sop_instance_uid,
            instance_number: record.instance_number,
            file_path: record.file_path,
            rows: record.rows,
            columns: record.columns,
            metadata: record.metadata,
        });
    }

    for study in &mut studies {
        study.series.sort_by_key(|series| series.series_number);
        for series in &mut study.series {
            series
                .instances
                .sort_by_key(|instance| instance.instance_number);
        }
        debug_assert!(!study.series.is_empty());
        debug_assert!(study
            .series
            .iter()
            .all(|series| !series.instances.is_empty()));
    }

    studies
}

/// Parses each file, skipping (and reporting) the unreadable ones.
pub fn load_studies_from_files(paths: Vec<PathBuf>) -> LoadReport {
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        match read_instance(path) {
            Ok(record) => records.push(record),
            Err(err) => failures.push(err.to_string()),
        }
    }

    LoadReport {
        studies: group_records(records),
        failures,
    }
}

/// Scans a folder recursively and loads every candidate file in it.
pub fn load_studies_from_directory(dir: &Path) -> Result<LoadReport, LoadError> {
    let files = scan_dicom_files(dir)?;
    log::info!(
        "Scanning {}: {} candidate file(s)",
        dir.display(),
        files.len()
    );
    Ok(load_studies_from_files(files))
}

fn attribute_text(object: &DefaultDicomObject, name: &str) -> Option<String> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn attribute_or_unknown(object: &DefaultDicomObject, name: &str) -> String {
    attribute_text(object, name).unwrap_or_else(|| "Unknown".to_string())
}

fn attribute_number<T: FromStr>(object: &DefaultDicomObject, name: &str) -> Option<T> {
    attribute_text(object, name).and_then(|value| value.parse().ok())
}
