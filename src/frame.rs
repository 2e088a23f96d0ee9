//! The in-memory sample table that the QC battery operates on.
//!
//! A [`QcFrame`] owns one [`SampleRow`] per measurement and keeps the
//! four parts of `quality_flag_long` split into separate columns so the
//! checks can read and write individual parts without re-parsing the
//! string per access. Rows are identified by their construction index
//! (the `_row_id`); the frame never inserts, removes or reorders rows,
//! so the id stays stable for the lifetime of a QC run.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::FlagError;
use crate::flag::Flag;
use crate::flag_tuple::{FlagTuple, QcField};
use crate::qc_flags::QcFlags;

/// Stable identity of a row within one frame.
pub type RowId = usize;

/// One measurement: a single parameter sampled at one depth of one visit.
///
/// Field names follow the delivery format of the national datahost, so
/// the serde names match the external column headers (`DEPH`,
/// `LMQNT_VAL`) rather than the Rust field names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SampleRow {
    /// Parameter short code, e.g. `DOXY_BTL` or `NTRA`.
    pub parameter: String,
    /// Measured value; `None` when the sample was lost or not analyzed.
    #[serde(default)]
    pub value: Option<f64>,
    /// Sample depth in meters.
    #[serde(rename = "DEPH")]
    pub depth: f64,
    /// Identity of the station cast this row belongs to.
    pub visit_key: String,
    /// Geographic zone used as the statistics key.
    pub sea_basin: String,
    /// Month of the visit, 1-12.
    pub visit_month: u32,
    /// The four-part flag string; empty means no QC has been delivered.
    #[serde(default)]
    pub quality_flag_long: String,
    /// Per-row quantification limit, when the lab delivered one.
    #[serde(rename = "LMQNT_VAL", default)]
    pub quantification_limit: Option<f64>,
}

impl SampleRow {
    /// Whether the measured value is absent (null or NaN).
    pub fn value_is_missing(&self) -> bool {
        self.value.map_or(true, f64::is_nan)
    }
}

/// The split string columns of `quality_flag_long`.
#[derive(Debug, Clone, PartialEq)]
struct SplitFlags {
    incoming: Vec<String>,
    automatic: Vec<String>,
    manual: Vec<String>,
    total: Vec<String>,
}

/// The sample table under QC, with expanded flag columns and one info
/// column per check field.
#[derive(Debug, Clone)]
pub struct QcFrame {
    rows: Vec<SampleRow>,
    split: SplitFlags,
    info: BTreeMap<QcField, Vec<String>>,
}

impl QcFrame {
    /// Build a frame over `rows`, defaulting absent flag strings and
    /// expanding the flag columns.
    ///
    /// Fails with [`FlagError::MalformedQualityFlagLong`] when a
    /// delivered flag string does not have the four-part shape.
    pub fn new(rows: Vec<SampleRow>) -> Result<Self, FlagError> {
        let n = rows.len();
        let mut frame = Self {
            rows,
            split: SplitFlags {
                incoming: Vec::with_capacity(n),
                automatic: Vec::with_capacity(n),
                manual: Vec::with_capacity(n),
                total: Vec::with_capacity(n),
            },
            info: QcField::iter()
                .map(|field| (field, vec![Flag::NoQcPerformed.to_string(); n]))
                .collect(),
        };
        frame.expand_qc_columns()?;
        Ok(frame)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SampleRow> {
        self.rows
    }

    /// The persistent info column for `field` (`info_AUTO_QC_<Field>`).
    pub fn info_column(&self, field: QcField) -> &[String] {
        self.info
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All info columns with their external column names, for exporting
    /// the frame.
    pub fn info_columns(&self) -> impl Iterator<Item = (String, &[String])> + '_ {
        QcField::iter().map(|field| (field.info_column_name(), self.info_column(field)))
    }

    /// Re-split every `quality_flag_long` into the four string columns,
    /// defaulting empty strings to the all-zero record first.
    ///
    /// Idempotent; safe to call between checks. Also the place where a
    /// malformed string surfaces as a hard error.
    pub fn expand_qc_columns(&mut self) -> Result<(), FlagError> {
        self.split.incoming.clear();
        self.split.automatic.clear();
        self.split.manual.clear();
        self.split.total.clear();

        for row in &mut self.rows {
            if row.quality_flag_long.is_empty() {
                row.quality_flag_long = QcFlags::new().to_string();
            }
            let mut parts = row.quality_flag_long.split('_');
            match (
                parts.next(),
                parts.next(),
                parts.next(),
                parts.next(),
                parts.next(),
            ) {
                (Some(i), Some(a), Some(m), Some(t), None) => {
                    self.split.incoming.push(i.to_string());
                    self.split.automatic.push(a.to_string());
                    self.split.manual.push(m.to_string());
                    self.split.total.push(t.to_string());
                }
                _ => return Err(FlagError::malformed(&row.quality_flag_long)),
            }
        }
        Ok(())
    }

    /// The `INCOMING_QC` column value for `row_id`.
    pub(crate) fn incoming_qc(&self, row_id: RowId) -> &str {
        &self.split.incoming[row_id]
    }

    /// The `TOTAL_QC` column value for `row_id`.
    pub(crate) fn total_qc(&self, row_id: RowId) -> &str {
        &self.split.total[row_id]
    }

    /// The `AUTO_QC` column value for `row_id`.
    pub(crate) fn auto_qc(&self, row_id: RowId) -> &str {
        &self.split.automatic[row_id]
    }

    /// Reset the info column for `field` ahead of a fresh check run.
    pub(crate) fn reset_info_column(&mut self, field: QcField) {
        let column = vec![Flag::NoQcPerformed.to_string(); self.rows.len()];
        self.info.insert(field, column);
    }

    pub(crate) fn set_info(&mut self, field: QcField, row_id: RowId, info: String) {
        if let Some(column) = self.info.get_mut(&field) {
            column[row_id] = info;
        }
    }

    /// Splice the per-check flag column into position `field` of every
    /// row's `AUTO_QC` part and reassemble `quality_flag_long`.
    ///
    /// The automatic part goes through [`FlagTuple`] so that a delivered
    /// string shorter than the field's position grows with `0` fills
    /// instead of corrupting later positions. The total part is carried
    /// over unchanged; the orchestrator recomputes it once all checks
    /// have run.
    pub(crate) fn collapse_qc_columns(
        &mut self,
        field: QcField,
        flags: &[Flag],
    ) -> Result<(), FlagError> {
        debug_assert_eq!(flags.len(), self.rows.len());

        for (row_id, row) in self.rows.iter_mut().enumerate() {
            let mut automatic: FlagTuple = self.split.automatic[row_id]
                .parse()
                .map_err(|_| FlagError::malformed(&row.quality_flag_long))?;
            automatic.set_field(field, flags[row_id]);
            self.split.automatic[row_id] = automatic.to_string();

            row.quality_flag_long = format!(
                "{}_{}_{}_{}",
                self.split.incoming[row_id],
                self.split.automatic[row_id],
                self.split.manual[row_id],
                self.split.total[row_id],
            );
        }
        Ok(())
    }

    /// Overwrite one row's flag string and keep the split columns in step.
    pub(crate) fn set_quality_flag_long(&mut self, row_id: RowId, value: String) {
        let mut parts = value.split('_');
        if let (Some(i), Some(a), Some(m), Some(t), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            self.split.incoming[row_id] = i.to_string();
            self.split.automatic[row_id] = a.to_string();
            self.split.manual[row_id] = m.to_string();
            self.split.total[row_id] = t.to_string();
        }
        self.rows[row_id].quality_flag_long = value;
    }
}
