//! Repeated value check (automatic flag position 3).
//!
//! Catches copy-paste errors in delivered bottle data: a value identical
//! to the previous non-null value of the profile is only probably good.
//! The comparison uses the configured sentinel difference (0 in the
//! shipped configuration) rather than exact equality so deliveries with
//! a known offset can be handled the same way.
use crate::config::RepeatedValueCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, visit_profiles, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &RepeatedValueCheck,
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
                None => CheckResult::new(Flag::Good, "GOOD first value of profile".to_string()),
                Some(prev) if value - prev == config.repeated_value => CheckResult::new(
                    Flag::ProbablyGood,
                    "PROBABLY_GOOD value is identical to the value at the sampled depth above"
                        .to_string(),
                ),
                Some(_) => CheckResult::new(Flag::Good, "GOOD value".to_string()),
            };
            results.push((row_id, result));
            previous = Some(value);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{frame, sample};

    const SENTINEL_ZERO: RepeatedValueCheck = RepeatedValueCheck { repeated_value: 0.0 };

    #[test]
    fn test_repeated_value_is_probably_good() {
        let frame = frame(vec![
            sample("SALT_BTL", Some(1.0), 5.0),
            sample("SALT_BTL", Some(1.0), 10.0),
            sample("SALT_BTL", Some(2.0), 15.0),
        ]);
        let mut results = check(&frame, "SALT_BTL", &SENTINEL_ZERO);
        results.sort_by_key(|(row_id, _)| *row_id);

        let flags: Vec<Flag> = results.iter().map(|(_, r)| r.flag).collect();
        assert_eq!(flags, [Flag::Good, Flag::ProbablyGood, Flag::Good]);
    }

    #[test]
    fn test_null_gap_does_not_reset_previous_value() {
        // The comparison is against the previous *non-null* value, so a
        // lost sample in between does not hide the repetition.
        let frame = frame(vec![
            sample("SALT_BTL", Some(1.0), 5.0),
            sample("SALT_BTL", None, 10.0),
            sample("SALT_BTL", Some(1.0), 15.0),
        ]);
        let mut results = check(&frame, "SALT_BTL", &SENTINEL_ZERO);
        results.sort_by_key(|(row_id, _)| *row_id);

        let flags: Vec<Flag> = results.iter().map(|(_, r)| r.flag).collect();
        assert_eq!(flags, [Flag::Good, Flag::Missing, Flag::ProbablyGood]);
    }

    #[test]
    fn test_profiles_sorted_by_depth_not_row_order() {
        let frame = frame(vec![
            sample("SALT_BTL", Some(2.0), 15.0),
            sample("SALT_BTL", Some(1.0), 5.0),
            sample("SALT_BTL", Some(2.0), 10.0),
        ]);
        let mut results = check(&frame, "SALT_BTL", &SENTINEL_ZERO);
        results.sort_by_key(|(row_id, _)| *row_id);

        // Depth order is 5, 10, 15 -> values 1, 2, 2: the 15 m row
        // repeats the 10 m row.
        let flags: Vec<Flag> = results.iter().map(|(_, r)| r.flag).collect();
        assert_eq!(flags, [Flag::ProbablyGood, Flag::Good, Flag::Good]);
    }

    #[test]
    fn test_visits_are_independent() {
        let mut other_visit = sample("SALT_BTL", Some(1.0), 5.0);
        other_visit.visit_key = "77-10-2024-0006".to_string();
        let frame = frame(vec![sample("SALT_BTL", Some(1.0), 5.0), other_visit]);

        let results = check(&frame, "SALT_BTL", &SENTINEL_ZERO);
        assert!(results.iter().all(|(_, r)| r.flag == Flag::Good));
    }
}
