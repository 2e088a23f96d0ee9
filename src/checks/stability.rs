//! Stability check (automatic flag position 4).
//!
//! Density should not decrease with depth; the size of a decrease
//! between consecutive samples grades the profile from good to bad over
//! three configured bands (`bad_decrease < probably_bad_decrease <
//! probably_good_decrease`). The first sample of a profile has nothing
//! to compare against and stays unchecked.
use crate::config::StabilityCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, visit_profiles, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &StabilityCheck,
) -> Vec<(RowId, CheckResult)> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    for profile in visit_profiles(frame, parameter) {
        let mut previous: Option<f64> = None;
        for row_id in profile {
            let value = frame.rows()[row_id]
                .value
                .expect("profiles contain only rows with a value");

            let result = match previous {
                None => CheckResult::new(
                    Flag::NoQcPerformed,
                    "No difference available e.g. first depth with value at visit".to_string(),
                ),
                Some(prev) => {
                    let d = value - prev;
                    if d < config.bad_decrease {
                        CheckResult::new(
                            Flag::Bad,
                            format!(
                                "BAD instable profile, decrease of {d:.4} is larger than the \
                                 allowed limit {} kg/m3",
                                config.bad_decrease
                            ),
                        )
                    } else if d < config.probably_bad_decrease {
                        CheckResult::new(
                            Flag::BadCorrectable,
                            format!(
                                "PROBABLY_BAD instable profile, decrease of {d:.4} is between \
                                 {} and {} kg/m3",
                                config.bad_decrease, config.probably_bad_decrease
                            ),
                        )
                    } else if d < config.probably_good_decrease {
                        CheckResult::new(
                            Flag::ProbablyGood,
                            format!(
                                "PROBABLY_GOOD instable profile, decrease of {d:.4} is between \
                                 {} and {} kg/m3",
                                config.probably_bad_decrease, config.probably_good_decrease
                            ),
                        )
                    } else {
                        CheckResult::new(
                            Flag::Good,
                            format!("GOOD stable profile, change of {d:.4} kg/m3 is acceptable"),
                        )
                    }
                }
            };
            results.push((row_id, result));
            previous = Some(value);
        }
    }

    results
}
