//! Consistency check (automatic flag position 7).
//!
//! A total parameter (total nitrogen, total phosphorus, ...) can never
//! hold less than the sum of its measured fractions. The check sums the
//! configured fraction parameters per (visit, depth) group and grades
//! the difference `value - sum` against two bounds pairs. Within a
//! group, a lost fraction counts as 0; only a group with no usable
//! fraction at all withholds the check.
use std::collections::HashMap;

use itertools::Itertools;

use crate::config::ConsistencyCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, sample_key, CheckResult};

/// Conversion factor from mg/l to umol/l applied to total organic
/// carbon before comparing it against its fractions.
pub const TOC_UNIT_CONVERSION: f64 = 83.25701;

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &ConsistencyCheck,
) -> Vec<(RowId, CheckResult)> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    // Per-group sum over the fraction parameters, None when every
    // fraction in the group is missing.
    let mut sums: HashMap<(&str, u64), Option<f64>> = HashMap::new();
    for row in frame.rows() {
        if !config.parameter_list.contains(&row.parameter) {
            continue;
        }
        let entry = sums.entry(sample_key(row)).or_insert(None);
        if !row.value_is_missing() {
            let value = row.value.expect("checked for missing above");
            *entry = Some(entry.unwrap_or(0.0) + value);
        }
    }

    let fraction_names = config.parameter_list.iter().join(", ");
    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != parameter || row.value_is_missing() {
            continue;
        }
        let value = row.value.expect("missing values were handled above");

        let Some(Some(sum)) = sums.get(&sample_key(row)).copied() else {
            results.push((
                row_id,
                CheckResult::new(
                    Flag::NoQcPerformed,
                    format!("NO_QC_PERFORMED {fraction_names} not available"),
                ),
            ));
            continue;
        };

        let converted = if row.parameter == "TOC" {
            value * TOC_UNIT_CONVERSION
        } else {
            value
        };
        let difference = converted - sum;

        let result = if difference >= config.good_lower && difference <= config.good_upper {
            CheckResult::new(
                Flag::Good,
                format!(
                    "GOOD difference {parameter} - ({fraction_names}) = {difference:.2} is \
                     within {} - {}",
                    config.good_lower, config.good_upper
                ),
            )
        } else if difference >= config.max_lower && difference <= config.max_upper {
            CheckResult::new(
                Flag::BadCorrectable,
                format!(
                    "BAD_DATA_CORRECTABLE difference {parameter} - ({fraction_names}) = \
                     {difference:.2} outside allowed range but within {} - {}",
                    config.max_lower, config.max_upper
                ),
            )
        } else {
            CheckResult::new(
                Flag::Bad,
                format!(
                    "BAD difference {parameter} - ({fraction_names}) = {difference:.2} \
                     outside allowed range {} - {}",
                    config.max_lower, config.max_upper
                ),
            )
        };
        results.push((row_id, result));
    }

    results
}
