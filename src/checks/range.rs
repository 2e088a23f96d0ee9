//! Range check (automatic flag position 1): a plain min/max gate on the
//! measured value.
use crate::config::RangeCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &RangeCheck,
) -> Vec<(RowId, CheckResult)> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    let min = config.min_range_value;
    let max = config.max_range_value;

    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != parameter || row.value_is_missing() {
            continue;
        }
        let value = row.value.expect("missing values were handled above");

        let result = if value >= min && value <= max {
            CheckResult::new(Flag::Good, format!("GOOD {value} in range {min} - {max}"))
        } else {
            CheckResult::new(Flag::Bad, format!("BAD {value} out of range {min} - {max}"))
        };
        results.push((row_id, result));
    }

    results
}
