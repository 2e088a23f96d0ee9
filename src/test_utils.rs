use std::path::PathBuf;

use crate::frame::{QcFrame, SampleRow};

pub(crate) fn test_data_dir() -> PathBuf {
    PathBuf::from(file!())
        .parent().unwrap()
        .parent().unwrap()
        .join("test-data")
}

/// A sample row with sensible defaults for the fields a test does not
/// care about.
pub(crate) fn sample(parameter: &str, value: Option<f64>, depth: f64) -> SampleRow {
    SampleRow {
        parameter: parameter.to_string(),
        value,
        depth,
        visit_key: "77-10-2024-0005".to_string(),
        sea_basin: "Kattegat".to_string(),
        visit_month: 1,
        quality_flag_long: String::new(),
        quantification_limit: None,
    }
}

pub(crate) fn frame(rows: Vec<SampleRow>) -> QcFrame {
    QcFrame::new(rows).expect("test rows carry well-formed flag strings")
}
