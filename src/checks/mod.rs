//! The automatic check battery and its shared lifecycle.
//!
//! Every check follows the same three steps: the frame's flag columns
//! are expanded, the check computes a `{flag, info}` pair for each row
//! of the parameter under test, and the per-check column is collapsed
//! back into its fixed position of the `AUTO_QC` part. The harness in
//! this module owns steps one and three so the algorithm modules stay
//! pure functions over the frame.
//!
//! A check writes only its own slot, is idempotent for a given frame
//! and configuration, and emits flag `0` when its prerequisites are
//! absent. Algorithm failures never abort a run; the harness absorbs
//! them into the info column and leaves the flags at `0`.
use indexmap::IndexMap;

use crate::config::CheckEntry;
use crate::error::FlagError;
use crate::flag::Flag;
use crate::flag_tuple::QcField;
use crate::frame::{QcFrame, RowId};

pub mod consistency;
pub mod dependency;
pub mod gradient;
pub mod h2s;
pub mod quantification_limit;
pub mod range;
pub mod repeated_value;
pub mod spike;
pub mod stability;
pub mod statistic;

/// The verdict a check produced for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub flag: Flag,
    pub info: String,
}

impl CheckResult {
    pub fn new<S: Into<String>>(flag: Flag, info: S) -> Self {
        Self {
            flag,
            info: info.into(),
        }
    }
}

/// Failures local to one check invocation.
///
/// These are absorbed by the orchestrator: the affected parameter's
/// rows keep flag `0` and the info column records the cause.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The registry handed an entry of the wrong kind to a check.
    #[error("Configuration entry does not belong to the {0} check")]
    MismatchedEntry(QcField),
    /// A lazily loaded statistics table could not be read.
    #[error("Could not load statistics: {0}")]
    Statistics(String),
    /// The configured `skip_flag` pattern is not a valid expression.
    #[error("Invalid skip_flag pattern '{0}'")]
    BadSkipFlag(String),
}

/// One check's pass over the frame: expansion, per-parameter runs, and
/// the final collapse into the check's `AUTO_QC` position.
pub(crate) struct CheckRunner<'f> {
    frame: &'f mut QcFrame,
    field: QcField,
    /// The ephemeral `AUTO_QC_<Field>` column.
    flags: Vec<Flag>,
}

impl<'f> CheckRunner<'f> {
    /// Expand the frame's flag columns and start a fresh pass for `field`.
    pub fn new(frame: &'f mut QcFrame, field: QcField) -> Result<Self, FlagError> {
        frame.expand_qc_columns()?;
        frame.reset_info_column(field);
        let flags = vec![Flag::NoQcPerformed; frame.len()];
        Ok(Self {
            frame,
            field,
            flags,
        })
    }

    /// Run this field's algorithm for one parameter and merge the
    /// results into the check columns by row id.
    pub fn check(&mut self, parameter: &str, entry: &CheckEntry) -> Result<(), CheckError> {
        let results = match (self.field, entry) {
            (QcField::QuantificationLimit, CheckEntry::QuantificationLimit(cfg)) => {
                quantification_limit::check(self.frame, parameter, cfg)
            }
            (QcField::Range, CheckEntry::Range(cfg)) => Ok(range::check(self.frame, parameter, cfg)),
            (QcField::Statistic, CheckEntry::Statistic(cfg)) => {
                statistic::check(self.frame, parameter, cfg)
            }
            (QcField::RepeatedValue, CheckEntry::RepeatedValue(cfg)) => {
                Ok(repeated_value::check(self.frame, parameter, cfg))
            }
            (QcField::Stability, CheckEntry::Stability(cfg)) => {
                Ok(stability::check(self.frame, parameter, cfg))
            }
            (QcField::Gradient, CheckEntry::Gradient(cfg)) => {
                Ok(gradient::check(self.frame, parameter, cfg))
            }
            (QcField::Spike, CheckEntry::Spike(cfg)) => Ok(spike::check(self.frame, parameter, cfg)),
            (QcField::Consistency, CheckEntry::Consistency(cfg)) => {
                Ok(consistency::check(self.frame, parameter, cfg))
            }
            (QcField::H2s, CheckEntry::H2s(cfg)) => h2s::check(self.frame, parameter, cfg),
            (QcField::Dependency, CheckEntry::Dependency(cfg)) => {
                Ok(dependency::check(self.frame, parameter, cfg))
            }
            _ => Err(CheckError::MismatchedEntry(self.field)),
        }?;

        for (row_id, result) in results {
            self.flags[row_id] = result.flag;
            self.frame.set_info(self.field, row_id, result.info);
        }
        Ok(())
    }

    /// Record an absorbed failure: the parameter's rows keep flag `0`
    /// and the info column names the cause.
    pub fn record_failure(&mut self, parameter: &str, error: &CheckError) {
        let affected: Vec<RowId> = self
            .frame
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.parameter == parameter)
            .map(|(i, _)| i)
            .collect();
        let info = format!("NO_QC_PERFORMED check failed: {error}");
        for row_id in affected {
            self.flags[row_id] = Flag::NoQcPerformed;
            self.frame.set_info(self.field, row_id, info.clone());
        }
    }

    /// Splice the pass's flag column into the frame.
    pub fn collapse(self) -> Result<(), FlagError> {
        self.frame.collapse_qc_columns(self.field, &self.flags)
    }
}

/// The shared missing-value preamble: every check flags a null or NaN
/// value as `9` before running its own logic.
pub(crate) fn flag_missing_values(
    frame: &QcFrame,
    parameter: &str,
    results: &mut Vec<(RowId, CheckResult)>,
) {
    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter == parameter && row.value_is_missing() {
            results.push((
                row_id,
                CheckResult::new(Flag::Missing, format!("MISSING no value for {parameter}")),
            ));
        }
    }
}

/// Row ids of `parameter` rows with a usable value, grouped per visit
/// and sorted by depth: the profiles the depth-window checks walk.
pub(crate) fn visit_profiles(frame: &QcFrame, parameter: &str) -> Vec<Vec<RowId>> {
    let mut groups: IndexMap<&str, Vec<RowId>> = IndexMap::new();
    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter == parameter && !row.value_is_missing() {
            groups
                .entry(row.visit_key.as_str())
                .or_default()
                .push(row_id);
        }
    }

    let mut profiles: Vec<Vec<RowId>> = groups.into_values().collect();
    for profile in profiles.iter_mut() {
        profile.sort_by(|&a, &b| frame.rows()[a].depth.total_cmp(&frame.rows()[b].depth));
    }
    profiles
}

/// Group key for the cross-parameter checks that join on the exact
/// sampled depth within a visit.
pub(crate) fn sample_key(row: &crate::frame::SampleRow) -> (&str, u64) {
    (row.visit_key.as_str(), row.depth.to_bits())
}
