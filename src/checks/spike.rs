//! Spike check (automatic flag position 6).
//!
//! A QARTOD-style spike test: each interior sample of a profile is
//! compared against a reference interpolated from its two neighbours,
//! weighted by depth distance. A large excursion only counts as a spike
//! when the surrounding water column itself is calm, which is what the
//! rate-of-change gate expresses. Rows already carrying a bad total
//! flag are excluded from the profile so a confirmed outlier does not
//! drag its neighbours down with it; this is why the check must run
//! after the checks that produce those totals.
use crate::config::SpikeCheck;
use crate::flag::Flag;
use crate::frame::{QcFrame, RowId};

use super::{flag_missing_values, CheckResult};

pub(crate) fn check(
    frame: &QcFrame,
    parameter: &str,
    config: &SpikeCheck,
) -> Vec<(RowId, CheckResult)> {
    let mut results = Vec::new();
    flag_missing_values(frame, parameter, &mut results);

    let bad_total = Flag::Bad.to_string();
    let mut profiles = super::visit_profiles(frame, parameter);
    for profile in profiles.iter_mut() {
        profile.retain(|&row_id| frame.total_qc(row_id) != bad_total);
    }

    for profile in profiles {
        for (pos, &row_id) in profile.iter().enumerate() {
            let row = &frame.rows()[row_id];
            let value = row.value.expect("profiles contain only rows with a value");

            if pos == 0 || pos == profile.len() - 1 {
                results.push((
                    row_id,
                    CheckResult::new(
                        Flag::NoQcPerformed,
                        "No spike reference, profile edge without both neighbours".to_string(),
                    ),
                ));
                continue;
            }

            let prev_row = &frame.rows()[profile[pos - 1]];
            let next_row = &frame.rows()[profile[pos + 1]];
            let prev = prev_row.value.expect("profiles contain only rows with a value");
            let next = next_row.value.expect("profiles contain only rows with a value");

            let depth_span = next_row.depth - prev_row.depth;
            let weighted_ref = next * ((row.depth - next_row.depth).abs() / depth_span)
                + prev * ((row.depth - prev_row.depth).abs() / depth_span);
            let spike = ((value - weighted_ref).abs() - 0.5 * (next - prev).abs()).abs();
            let rate = (next - prev).abs() / depth_span.abs();

            let result = if spike >= config.threshold_high && rate <= config.rate_of_change {
                CheckResult::new(
                    Flag::Bad,
                    format!(
                        "BAD spike {spike:.2} >= {}. Previous {prev:.2}, next {next:.2}, \
                         rate of change {rate:.2}",
                        config.threshold_high
                    ),
                )
            } else if spike >= config.threshold_low
                && spike < config.threshold_high
                && rate <= config.rate_of_change
            {
                CheckResult::new(
                    Flag::BadCorrectable,
                    format!(
                        "BAD_DATA_CORRECTABLE spike {spike:.2} in {} - {}. Previous {prev:.2}, \
                         next {next:.2}, rate of change {rate:.2}",
                        config.threshold_low, config.threshold_high
                    ),
                )
            } else {
                CheckResult::new(
                    Flag::Good,
                    format!(
                        "GOOD spike {spike:.2} < {}. Rate of change {rate:.2}, tested values \
                         {prev:.2}, {value:.2}, {next:.2}",
                        config.threshold_low
                    ),
                )
            };
            results.push((row_id, result));
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{frame, sample};

    fn config(threshold_high: f64, threshold_low: f64, rate_of_change: f64) -> SpikeCheck {
        SpikeCheck {
            threshold_high,
            threshold_low,
            rate_of_change,
        }
    }

    fn doxy_profile() -> crate::frame::QcFrame {
        frame(vec![
            sample("DOXY_BTL", Some(1.0), 0.0),
            sample("DOXY_BTL", Some(0.5), 5.0),
            sample("DOXY_BTL", Some(7.0), 10.0),
            sample("DOXY_BTL", Some(2.0), 15.0),
        ])
    }

    #[test]
    fn test_profile_edges_are_unchecked() {
        let frame = doxy_profile();
        let mut results = check(&frame, "DOXY_BTL", &config(0.5, 0.4, f64::INFINITY));
        results.sort_by_key(|(row_id, _)| *row_id);

        assert_eq!(results[0].1.flag, Flag::NoQcPerformed);
        assert_eq!(results[3].1.flag, Flag::NoQcPerformed);
    }

    #[test]
    fn test_interior_spikes_are_flagged() {
        // At 5 m: reference = 7*0.5 + 1*0.5 = 4, spike = |3.5 - 3| = 0.5.
        // At 10 m: reference = 2*0.5 + 0.5*0.5 = 1.25, spike = |5.75 - 0.75| = 5.
        let frame = doxy_profile();
        let mut results = check(&frame, "DOXY_BTL", &config(0.5, 0.4, f64::INFINITY));
        results.sort_by_key(|(row_id, _)| *row_id);

        assert_eq!(results[1].1.flag, Flag::Bad);
        assert_eq!(results[2].1.flag, Flag::Bad);
    }

    #[test]
    fn test_threshold_band_gives_correctable() {
        // Raising threshold_high above the 5 m spike of 0.5 moves that
        // row into the correctable band.
        let frame = doxy_profile();
        let mut results = check(&frame, "DOXY_BTL", &config(0.6, 0.4, f64::INFINITY));
        results.sort_by_key(|(row_id, _)| *row_id);

        assert_eq!(results[1].1.flag, Flag::BadCorrectable);
        assert_eq!(results[2].1.flag, Flag::Bad);
    }

    #[test]
    fn test_rate_of_change_gate_suppresses_spike() {
        // The water column around 10 m changes fast (|2 - 0.5| / 10 =
        // 0.15), so a strict gate writes the row off as natural change.
        let frame = doxy_profile();
        let mut results = check(&frame, "DOXY_BTL", &config(0.5, 0.4, 0.1));
        results.sort_by_key(|(row_id, _)| *row_id);

        assert_eq!(results[1].1.flag, Flag::Good);
        assert_eq!(results[2].1.flag, Flag::Good);
    }

    #[test]
    fn test_rows_with_bad_total_are_excluded_from_profile() {
        let mut rows = vec![
            sample("DOXY_BTL", Some(1.0), 0.0),
            sample("DOXY_BTL", Some(100.0), 5.0),
            sample("DOXY_BTL", Some(1.2), 10.0),
            sample("DOXY_BTL", Some(1.1), 15.0),
        ];
        rows[1].quality_flag_long = "0_0400000000_0_4".to_string();
        let frame = frame(rows);

        let mut results = check(&frame, "DOXY_BTL", &config(0.5, 0.4, f64::INFINITY));
        results.sort_by_key(|(row_id, _)| *row_id);

        // The flagged row is not part of the profile at all; the 10 m
        // row is judged against 0 m and 15 m instead of the outlier.
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|(row_id, _)| *row_id != 1));
        let interior = results.iter().find(|(row_id, _)| *row_id == 2).unwrap();
        assert_eq!(interior.1.flag, Flag::Good);
    }

    #[test]
    fn test_weighted_reference_accounts_for_uneven_spacing() {
        // With neighbours 1.0 at 0 m and 3.0 at 10 m, the reference for
        // a sample at 9 m is 3*(1/10) + 1*(9/10) = 1.2, so a value of
        // 2.0 gives spike ||2 - 1.2| - 0.5*2| = 0.2.
        let frame = frame(vec![
            sample("DOXY_BTL", Some(1.0), 0.0),
            sample("DOXY_BTL", Some(2.0), 9.0),
            sample("DOXY_BTL", Some(3.0), 10.0),
        ]);
        let mut results = check(&frame, "DOXY_BTL", &config(0.21, 0.19, f64::INFINITY));
        results.sort_by_key(|(row_id, _)| *row_id);

        assert_eq!(results[1].1.flag, Flag::BadCorrectable);
        assert!(results[1].1.info.contains("0.20"));
    }
}
