//! Hydrogen sulphide check (automatic flag position 8).
//!
//! Oxygen-consuming parameters cannot coexist with hydrogen sulphide:
//! when a trustworthy H2S measurement exists at the same visit and
//! depth, the target value is bad. An H2S row is only trusted when its
//! own automatic flags carry neither a bad (`4`) nor a below-detection
//! (`6`) verdict; that filter is fixed, while the codes that make the
//! check preserve the target's existing verdict come from the
//! configured `skip_flag` pattern.
use std::collections::HashMap;

use regex::Regex;

use crate::config::H2sCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, sample_key, CheckError, CheckResult};

/// Automatic flag codes that disqualify an H2S row from being used as
/// evidence against other parameters.
const UNTRUSTED_H2S_CODES: [char; 2] = ['6', '4'];

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &H2sCheck,
) -> Result<Vec<(RowId, CheckResult)>, CheckError> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    let skip_pattern = Regex::new(&config.skip_flag)
        .map_err(|_| CheckError::BadSkipFlag(config.skip_flag.clone()))?;

    // H2S evidence per (visit, depth): the value of a trusted H2S row.
    let mut h2s_values: HashMap<(&str, u64), f64> = HashMap::new();
    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != "H2S" || row.value_is_missing() {
            continue;
        }
        let automatic = frame.auto_qc(row_id);
        if automatic.contains(&UNTRUSTED_H2S_CODES[..]) {
            continue;
        }
        h2s_values
            .entry(sample_key(row))
            .or_insert(row.value.expect("checked for missing above"));
    }

    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != parameter || row.value_is_missing() {
            continue;
        }

        let result = if skip_pattern.is_match(&row.quality_flag_long) {
            CheckResult::new(
                Flag::BelowDetection,
                format!("BELOW_DETECTION {parameter} is below detection limit"),
            )
        } else if !h2s_values.contains_key(&sample_key(row)) {
            CheckResult::new(Flag::Good, "GOOD no h2s present".to_string())
        } else {
            CheckResult::new(Flag::Bad, format!("BAD {parameter} because h2s present"))
        };
        results.push((row_id, result));
    }

    Ok(results)
}
