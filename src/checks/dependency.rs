//! Dependency check (automatic flag position 9).
//!
//! A derived parameter (a sum or a computed quantity) inherits the
//! verdict of the parameters it was derived from. The combined flag
//! strings of the dependees at the same visit and depth are scanned for
//! the first code in a fixed severity order; only the verdict codes
//! `1`-`4` carry over, anything else leaves the dependent parameter
//! unchecked with an explanation.
use std::collections::HashMap;

use crate::config::DependencyCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, sample_key, CheckResult};

/// Scan order over the combined dependee flag strings. Verdicts first,
/// then the non-verdict codes, `0` last as the universal fallback.
const SCAN_ORDER: [char; 10] = ['4', '3', '2', '1', '9', '8', '7', '6', '5', '0'];

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &DependencyCheck,
) -> Vec<(RowId, CheckResult)> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    // Combined dependee flag strings per (visit, depth).
    let mut combined: HashMap<(&str, u64), String> = HashMap::new();
    for row in frame.rows() {
        if config.parameter_list.contains(&row.parameter) && !row.value_is_missing() {
            combined
                .entry(sample_key(row))
                .or_default()
                .push_str(&row.quality_flag_long);
        }
    }

    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != parameter || row.value_is_missing() {
            continue;
        }

        let dependency_flag = combined
            .get(&sample_key(row))
            .and_then(|flags| SCAN_ORDER.iter().copied().find(|c| flags.contains(*c)));

        let result = match dependency_flag {
            Some(code @ '1'..='4') => {
                let flag = Flag::from_char(code).expect("verdict codes are valid flags");
                CheckResult::new(
                    flag,
                    format!("Dependent parameter gets the following flag: {code}"),
                )
            }
            Some(code) => CheckResult::new(
                Flag::NoQcPerformed,
                format!("No QC performed since associated parameters contain flag: {code}"),
            ),
            None => CheckResult::new(
                Flag::NoQcPerformed,
                "No QC performed since no associated parameter is available".to_string(),
            ),
        };
        results.push((row_id, result));
    }

    results
}
