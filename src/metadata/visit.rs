//! The visit view: all rows sharing one `visit_key`, seen through the
//! metadata columns the validators care about.
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use super::{MetadataFlag, MetadataQcField};

/// The header columns that should hold one common value per visit.
pub const METADATA_FIELDS: [&str; 13] = [
    "AIRPRES",
    "AIRTEMP",
    "COMNT_VISIT",
    "CRUISE_NO",
    "CTRYID",
    "LATIT",
    "LONGI",
    "SHIPC",
    "STATN",
    "SERNO",
    "WADEP",
    "WINDIR",
    "WINSP",
];

/// Errors when constructing or querying a visit.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VisitError {
    #[error("Visit has no rows")]
    Empty,
    #[error("Visit rows are missing the '{0}' column")]
    MissingColumn(&'static str),
}

/// One station cast: a set of generic column/value records plus the
/// accumulated metadata QC verdicts and their explanation log.
#[derive(Debug)]
pub struct Visit {
    records: Vec<IndexMap<String, String>>,
    qc: BTreeMap<MetadataQcField, MetadataFlag>,
    log: BTreeMap<MetadataQcField, IndexMap<String, Vec<String>>>,
}

impl Visit {
    pub fn new(records: Vec<IndexMap<String, String>>) -> Result<Self, VisitError> {
        if records.is_empty() {
            return Err(VisitError::Empty);
        }
        let qc = <MetadataQcField as strum::IntoEnumIterator>::iter()
            .map(|field| (field, MetadataFlag::NoQcPerformed))
            .collect();
        Ok(Self {
            records,
            qc,
            log: BTreeMap::new(),
        })
    }

    fn column_values<'v>(&'v self, column: &'v str) -> impl Iterator<Item = &'v str> {
        self.records
            .iter()
            .filter_map(move |record| record.get(column))
            .map(String::as_str)
    }

    /// The unique sampled depths of the visit.
    pub fn water_depths(&self) -> Result<Vec<f64>, VisitError> {
        let mut depths: Vec<f64> = self
            .column_values("DEPH")
            .filter_map(|value| value.trim().parse().ok())
            .collect();
        if depths.is_empty() {
            return Err(VisitError::MissingColumn("DEPH"));
        }
        depths.sort_by(f64::total_cmp);
        depths.dedup();
        Ok(depths)
    }

    /// The unique (date, time) pairs reported for the visit. A missing
    /// column shows up as the empty string so the date validator can
    /// report it.
    pub fn times(&self) -> BTreeSet<(String, String)> {
        self.records
            .iter()
            .map(|record| {
                (
                    record.get("SDATE").cloned().unwrap_or_default(),
                    record.get("STIME").cloned().unwrap_or_default(),
                )
            })
            .collect()
    }

    /// The unique (latitude, longitude) pairs reported for the visit.
    pub fn positions(&self) -> BTreeSet<(String, String)> {
        self.records
            .iter()
            .filter_map(|record| {
                match (record.get("LATIT"), record.get("LONGI")) {
                    (Some(lat), Some(lon)) => Some((lat.clone(), lon.clone())),
                    _ => None,
                }
            })
            .collect()
    }

    /// The unique values of one metadata column; empty when the column
    /// is absent.
    pub fn metadata(&self, field: &str) -> BTreeSet<String> {
        self.column_values(field).map(str::to_string).collect()
    }

    /// The metadata columns actually present in this visit's records.
    pub fn present_metadata_fields(&self) -> Vec<&'static str> {
        METADATA_FIELDS
            .iter()
            .copied()
            .filter(|field| self.records.iter().any(|record| record.contains_key(*field)))
            .collect()
    }

    /// The per-category verdicts.
    pub fn qc(&self) -> &BTreeMap<MetadataQcField, MetadataFlag> {
        &self.qc
    }

    pub(crate) fn set_flag(&mut self, field: MetadataQcField, flag: MetadataFlag) {
        self.qc.insert(field, flag);
    }

    /// The per-category, per-column explanation messages.
    pub fn log(&self) -> &BTreeMap<MetadataQcField, IndexMap<String, Vec<String>>> {
        &self.log
    }

    pub(crate) fn record_issue<S: Into<String>>(
        &mut self,
        field: MetadataQcField,
        column: &str,
        message: S,
    ) {
        self.log
            .entry(field)
            .or_default()
            .entry(column.to_string())
            .or_default()
            .push(message.into());
    }
}
