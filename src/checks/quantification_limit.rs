//! Quantification limit check (automatic flag position 0).
//!
//! Values strictly above the limit are good; values strictly below it
//! are flagged `Q`. A value sitting exactly on the limit keeps the
//! deliverer's verdict: good if delivered good, `Q` when delivered `Q`
//! or not assessed. The per-row `LMQNT_VAL` takes precedence over the
//! configured global limit.
use crate::config::QuantificationLimitCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, CheckError, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &QuantificationLimitCheck,
) -> Result<Vec<(RowId, CheckResult)>, CheckError> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    let good_code = Flag::Good.to_string();
    let below_code = Flag::BelowQuantification.to_string();

    for (row_id, row) in frame.rows().iter().enumerate() {
        if row.parameter != parameter || row.value_is_missing() {
            continue;
        }
        let value = row.value.expect("missing values were handled above");
        let limit = row.quantification_limit.unwrap_or(config.limit);
        let incoming = frame.incoming_qc(row_id);

        let result = if value > limit {
            CheckResult::new(
                Flag::Good,
                format!("GOOD value {value} > quantification limit {limit}"),
            )
        } else if value == limit && incoming == good_code {
            CheckResult::new(
                Flag::Good,
                format!("GOOD value delivered as good on quantification limit {limit}"),
            )
        } else if value < limit || (value == limit && incoming == below_code) {
            CheckResult::new(
                Flag::BelowQuantification,
                format!("BELOW_QUANTIFICATION {value} < {limit}, flagged as 'Q'"),
            )
        } else {
            CheckResult::new(
                Flag::BelowQuantification,
                format!("BELOW_QUANTIFICATION {value} on limit {limit} without a good incoming flag"),
            )
        };
        results.push((row_id, result));
    }

    Ok(results)
}
