//! Statistic check (automatic flag position 2).
//!
//! Classifies each value against climatological bands keyed by sea
//! basin, month and depth layer. The bands nest: inside the flag-1 band
//! the value is good, between the flag-1 and flag-2 bounds probably
//! good, between flag-2 and flag-3 correctable, outside everything bad.
//! A sample without a matching statistics row, or with gaps in the
//! band endpoints, is left unchecked rather than silently passed.
use crate::config::StatisticCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, CheckError, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &StatisticCheck,
) -> Result<Vec<(RowId, CheckResult)>, CheckError> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    // Touching the table outside the row loop surfaces a broken
    // statistics file once per parameter instead of once per row.
    let table = config
        .data()
        .map_err(|report| CheckError::Statistics(report.to_string()))?;

    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != parameter || row.value_is_missing() {
            continue;
        }
        let value = row.value.expect("missing values were handled above");
        let t = table.get_thresholds(&row.sea_basin, row.depth, row.visit_month);

        let result = if !t.has_flag_bounds() {
            CheckResult::new(
                Flag::NoQcPerformed,
                format!("NO_QC_PERFORMED thresholds missing for {parameter}"),
            )
        } else if value >= t.flag1_lower && value <= t.flag1_upper {
            CheckResult::new(
                Flag::Good,
                format!("GOOD {value} in [{}, {}]", t.flag1_lower, t.flag1_upper),
            )
        } else if (value > t.flag2_lower && value < t.flag1_lower)
            || (value > t.flag1_upper && value < t.flag2_upper)
        {
            CheckResult::new(
                Flag::ProbablyGood,
                format!(
                    "PROBABLY_GOOD {value} in range {} - {}",
                    t.flag2_lower, t.flag2_upper
                ),
            )
        } else if (value >= t.flag3_lower && value < t.flag2_lower)
            || (value > t.flag2_upper && value <= t.flag3_upper)
        {
            CheckResult::new(
                Flag::BadCorrectable,
                format!(
                    "BAD_DATA_CORRECTABLE {value} in range {} - {}",
                    t.flag3_lower, t.flag3_upper
                ),
            )
        } else {
            CheckResult::new(
                Flag::Bad,
                format!(
                    "BAD {value} outside range [{}, {}]",
                    t.flag3_lower, t.flag3_upper
                ),
            )
        };
        results.push((row_id, result));
    }

    Ok(results)
}
