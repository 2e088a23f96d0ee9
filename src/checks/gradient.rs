//! Gradient check (automatic flag position 5).
//!
//! The directed per-meter change between consecutive depths of a
//! profile must stay inside the configured window. The first sampled
//! depth of a profile has no gradient and stays unchecked, as does a
//! pair of samples reported at the same depth.
use crate::config::GradientCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, visit_profiles, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &GradientCheck,
) -> Vec<(RowId, CheckResult)> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    for profile in visit_profiles(frame, parameter) {
        let mut previous: Option<(f64, f64)> = None;
        for row_id in profile {
            let row = &frame.rows()[row_id];
            let value = row.value.expect("profiles contain only rows with a value");

            let gradient = previous
                .map(|(prev_value, prev_depth)| (value - prev_value) / (row.depth - prev_depth));
            let result = match gradient {
                Some(g) if g >= config.allowed_decrease && g <= config.allowed_increase => {
                    CheckResult::new(
                        Flag::Good,
                        format!(
                            "GOOD change from previous depth {g:.2} is within {} - {}",
                            config.allowed_decrease, config.allowed_increase
                        ),
                    )
                }
                Some(g) if g < config.allowed_decrease || g > config.allowed_increase => {
                    CheckResult::new(
                        Flag::Bad,
                        format!(
                            "BAD change from previous depth {g:.2} not within {} - {}",
                            config.allowed_decrease, config.allowed_increase
                        ),
                    )
                }
                // First depth of the profile, or a 0/0 gradient from a
                // duplicated sample.
                _ => CheckResult::new(
                    Flag::NoQcPerformed,
                    "No gradient available e.g. first depth with value at visit".to_string(),
                ),
            };
            results.push((row_id, result));
            previous = Some((value, row.depth));
        }
    }

    results
}
