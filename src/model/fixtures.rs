//! Hand-built entities shared by the model test modules.

use std::path::PathBuf;

use crate::model::entities::{Instance, Series, Study};

pub fn instance(uid: &str, number: i32) -> Instance {
    Instance {
        sop_instance_uid: uid.to_string(),
        instance_number: number,
        file_path: PathBuf::from(format!("/tmp/{uid}.dcm")),
        rows: Some(512),
        columns: Some(512),
        metadata: Vec::new(),
    }
}

pub fn series(uid: &str, number: i32, instance_count: usize) -> Series {
    assert!(instance_count > 0, "fixtures never build empty series");
    Series {
        series_instance_uid: uid.to_string(),
        series_number: number,
        description: format!("Series {number}"),
        modality: "CT".to_string(),
        instances: (0..instance_count)
            .map(|idx| instance(&format!("{uid}.I{}", idx + 1), idx as i32 + 1))
            .collect(),
    }
}

/// A study with `series_count` series of `instances_per_series` instances
/// each. Series UIDs are `<uid>.S1`, `<uid>.S2`, … so tests can address them.
pub fn study(uid: &str, series_count: usize, instances_per_series: usize) -> Study {
    assert!(series_count > 0, "fixtures never build empty studies");
    Study {
        study_instance_uid: uid.to_string(),
        patient_name: format!("Patient {uid}"),
        patient_id: format!("PID-{uid}"),
        study_date: "20240101".to_string(),
        description: format!("Study {uid}"),
        series: (1..=series_count)
            .map(|num| series(&format!("{uid}.S{num}"), num as i32, instances_per_series))
            .collect(),
    }
}
