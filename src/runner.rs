//! The orchestrator that runs the automatic check battery over a frame.
//!
//! Checks execute in [`QcField`] declaration order; the order is part of
//! the semantics (the spike check reads total flags, the dependency
//! check reads other parameters' flag strings) and must not change.
//! Afterwards the total flag is recomputed for exactly the rows whose
//! flag string changed during the run.
use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::checks::CheckRunner;
use crate::config::QcConfig;
use crate::error::QcError;
use crate::flag::Flag;
use crate::flag_tuple::QcField;
use crate::frame::QcFrame;
use crate::qc_flags::QcFlags;

/// Owns a frame for the duration of a QC run.
pub struct QcRunner {
    frame: QcFrame,
    config: QcConfig,
}

/// Per-row reporting data produced by [`QcRunner::total_flag_info`].
#[derive(Debug, Clone, PartialEq)]
pub struct TotalFlagInfo {
    /// The priority-worst automatic flag of the row.
    pub total_automatic: Flag,
    /// The check fields whose flag equals `total_automatic`.
    pub total_automatic_fields: Vec<QcField>,
    /// The info texts of those fields, `<Field>: <text>` joined by `; `.
    pub total_automatic_info: String,
}

impl TotalFlagInfo {
    /// The contributing field names joined by `; `, as written to the
    /// reporting column.
    pub fn fields_string(&self) -> String {
        self.total_automatic_fields
            .iter()
            .map(|field| field.to_string())
            .join("; ")
    }
}

impl QcRunner {
    pub fn new(frame: QcFrame, config: QcConfig) -> Self {
        Self { frame, config }
    }

    pub fn frame(&self) -> &QcFrame {
        &self.frame
    }

    /// Hand the frame back once the run is done.
    pub fn into_frame(self) -> QcFrame {
        self.frame
    }

    /// Run every configured check in battery order, then refresh the
    /// total flag of every row the battery touched.
    ///
    /// A failing check only withholds flags for its own parameter; a
    /// malformed flag string aborts the run and leaves the frame in the
    /// state after the last completed check.
    pub fn run_automatic_qc(&mut self) -> Result<(), QcError> {
        let snapshot: Vec<String> = self
            .frame
            .rows()
            .iter()
            .map(|row| row.quality_flag_long.clone())
            .collect();

        for field in QcField::iter() {
            log::info!("running {field} qc");
            let mut runner = CheckRunner::new(&mut self.frame, field)?;

            let category = field.category();
            for parameter in self.config.parameters(category) {
                let Some(entry) = self.config.get(category, parameter) else {
                    continue;
                };
                if let Err(error) = runner.check(parameter, entry) {
                    log::warn!("{field} check failed for parameter {parameter}: {error}");
                    runner.record_failure(parameter, &error);
                }
            }
            runner.collapse()?;
        }

        self.update_total(&snapshot)
    }

    /// Recompute the total part of `quality_flag_long` for the rows that
    /// differ from `snapshot`, by round-tripping through [`QcFlags`].
    fn update_total(&mut self, snapshot: &[String]) -> Result<(), QcError> {
        for row_id in 0..self.frame.len() {
            let updated = {
                let current = &self.frame.rows()[row_id].quality_flag_long;
                if current == &snapshot[row_id] {
                    None
                } else {
                    let parsed: QcFlags = current.parse()?;
                    Some(parsed.to_string())
                }
            };
            if let Some(value) = updated {
                self.frame.set_quality_flag_long(row_id, value);
            }
        }
        Ok(())
    }

    /// Build the optional reporting columns: the worst automatic flag
    /// per row, the fields that produced it, and their info texts.
    pub fn total_flag_info(&self) -> Result<Vec<TotalFlagInfo>, QcError> {
        let mut report = Vec::with_capacity(self.frame.len());
        for (row_id, row) in self.frame.rows().iter().enumerate() {
            let qc: QcFlags = row.quality_flag_long.parse()?;
            let fields = qc.total_automatic_source();
            let info = fields
                .iter()
                .map(|&field| format!("{field}: {}", self.frame.info_column(field)[row_id]))
                .join("; ");
            report.push(TotalFlagInfo {
                total_automatic: qc.total_automatic(),
                total_automatic_fields: fields,
                total_automatic_info: info,
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        CheckEntry, ConsistencyCheck, QuantificationLimitCheck, RangeCheck, SpikeCheck,
    };
    use crate::test_utils::{frame, sample};

    fn range_entry(min: f64, max: f64) -> CheckEntry {
        CheckEntry::Range(RangeCheck {
            min_range_value: min,
            max_range_value: max,
        })
    }

    #[test]
    fn test_category_field_bijection() {
        // Every field maps to a distinct category and back.
        let categories: Vec<&str> = QcField::iter().map(QcField::category).collect();
        let mut unique = categories.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), QcField::COUNT);

        for field in QcField::iter() {
            assert!(field.category().ends_with("_check"));
        }
    }

    #[test]
    fn test_run_writes_check_position_and_total() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));

        let mut runner = QcRunner::new(frame(vec![sample("AMON", Some(200.0), 10.0)]), config);
        runner.run_automatic_qc().unwrap();

        assert_eq!(
            runner.frame().rows()[0].quality_flag_long,
            "0_0400000000_0_4"
        );
    }

    #[test]
    fn test_unconfigured_rows_keep_incoming_total() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));

        let mut rows = vec![sample("AMON", Some(1.0), 10.0), sample("NTRA", Some(1.0), 10.0)];
        rows[1].quality_flag_long = "2_0000000000_0_2".to_string();
        let mut runner = QcRunner::new(frame(rows), config);
        runner.run_automatic_qc().unwrap();

        // The NTRA row was never touched, so its string is unchanged.
        assert_eq!(
            runner.frame().rows()[0].quality_flag_long,
            "0_0100000000_0_1"
        );
        assert_eq!(
            runner.frame().rows()[1].quality_flag_long,
            "2_0000000000_0_2"
        );
    }

    #[test]
    fn test_manual_flag_survives_run() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));

        let mut rows = vec![sample("AMON", Some(200.0), 10.0)];
        rows[0].quality_flag_long = "0_0000000000_1_1".to_string();
        let mut runner = QcRunner::new(frame(rows), config);
        runner.run_automatic_qc().unwrap();

        // The range check found bad data but the manual good verdict
        // still decides the total.
        assert_eq!(
            runner.frame().rows()[0].quality_flag_long,
            "0_0400000000_1_1"
        );
    }

    #[test]
    fn test_run_is_idempotent() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));
        config.insert(
            "AMON",
            CheckEntry::QuantificationLimit(QuantificationLimitCheck { limit: 0.5 }),
        );
        config.insert(
            "TOT",
            CheckEntry::Consistency(ConsistencyCheck {
                parameter_list: vec!["AMON".to_string()],
                good_lower: -0.05,
                good_upper: 0.0,
                max_lower: -1.0,
                max_upper: 0.0,
            }),
        );

        let rows = vec![
            sample("AMON", Some(200.0), 10.0),
            sample("AMON", Some(0.2), 20.0),
            sample("TOT", Some(0.1), 20.0),
            sample("NTRA", None, 20.0),
        ];
        let mut runner = QcRunner::new(frame(rows), config);
        runner.run_automatic_qc().unwrap();
        let first: Vec<String> = runner
            .frame()
            .rows()
            .iter()
            .map(|row| row.quality_flag_long.clone())
            .collect();
        let first_info: Vec<String> = runner.frame().info_column(QcField::Range).to_vec();

        runner.run_automatic_qc().unwrap();
        let second: Vec<String> = runner
            .frame()
            .rows()
            .iter()
            .map(|row| row.quality_flag_long.clone())
            .collect();

        assert_eq!(first, second);
        assert_eq!(first_info, runner.frame().info_column(QcField::Range));
    }

    #[test]
    fn test_battery_regenerates_the_automatic_part() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));

        // Delivered automatic verdicts belong to a previous battery run;
        // a full run replaces every slot, zeroing the unconfigured ones.
        let mut rows = vec![sample("AMON", Some(200.0), 10.0)];
        rows[0].quality_flag_long = "1_1030050000_0_3".to_string();
        let mut runner = QcRunner::new(frame(rows), config);
        runner.run_automatic_qc().unwrap();

        assert_eq!(
            runner.frame().rows()[0].quality_flag_long,
            "1_0400000000_0_4"
        );
    }

    #[test]
    fn test_spike_skips_rows_with_delivered_bad_total() {
        let mut config = QcConfig::new();
        config.insert(
            "DOXY_BTL",
            CheckEntry::Spike(SpikeCheck {
                threshold_high: 0.5,
                threshold_low: 0.4,
                rate_of_change: f64::INFINITY,
            }),
        );

        // The 5 m outlier already carries a bad total; the spike check
        // bridges over it instead of accusing its neighbours.
        let mut rows = vec![
            sample("DOXY_BTL", Some(1.0), 0.0),
            sample("DOXY_BTL", Some(100.0), 5.0),
            sample("DOXY_BTL", Some(1.2), 10.0),
            sample("DOXY_BTL", Some(1.1), 15.0),
        ];
        rows[1].quality_flag_long = "0_0000000000_4_4".to_string();
        let mut runner = QcRunner::new(frame(rows), config);
        runner.run_automatic_qc().unwrap();

        let spike_flag = |row: usize| {
            runner.frame().rows()[row]
                .quality_flag_long
                .split('_')
                .nth(1)
                .unwrap()
                .chars()
                .nth(QcField::Spike.index())
                .unwrap()
        };

        // Profile is 0/10/15 m: the interior 10 m row is good against
        // its real neighbours, the excluded row stays unchecked.
        assert_eq!(spike_flag(1), '0');
        assert_eq!(spike_flag(2), '1');
        assert_eq!(spike_flag(0), '0');
        assert_eq!(spike_flag(3), '0');
    }

    #[test]
    fn test_flag_string_outside_alphabet_aborts_recompute() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));

        // Four parts, so expansion accepts it, but the incoming code is
        // not in the flag alphabet; the total recompute rejects it.
        let mut rows = vec![sample("AMON", Some(1.0), 10.0)];
        rows[0].quality_flag_long = "x_0000000000_0_0".to_string();
        let mut runner = QcRunner::new(frame(rows), config);
        assert!(matches!(
            runner.run_automatic_qc(),
            Err(QcError::BadFlags(_))
        ));
    }

    #[test]
    fn test_malformed_flag_string_rejected_at_expansion() {
        let mut rows = vec![sample("AMON", Some(1.0), 10.0)];
        rows[0].quality_flag_long = "1_00".to_string();
        assert!(crate::frame::QcFrame::new(rows).is_err());
    }

    #[test]
    fn test_full_battery_with_loaded_configuration() {
        let dir = crate::test_utils::test_data_dir().join("config");
        let config = QcConfig::load(&dir).unwrap();

        let mut h2s_row = sample("H2S", Some(0.8), 20.0);
        h2s_row.quality_flag_long = "0_0000000000_0_0".to_string();
        let rows = vec![
            // Out of range and above the quantification limit.
            sample("AMON", Some(200.0), 10.0),
            // NTRA at a depth where H2S is present.
            sample("NTRA", Some(1.23), 20.0),
            h2s_row,
            // Statistic check: 5 m in Kattegat in January, good band.
            sample("TEMP_CTD", Some(5.0), 5.0),
        ];

        let mut runner = QcRunner::new(frame(rows), config);
        runner.run_automatic_qc().unwrap();

        let flags: Vec<&str> = runner
            .frame()
            .rows()
            .iter()
            .map(|row| row.quality_flag_long.as_str())
            .collect();

        // AMON: quantification limit good (200 > 0.2) at slot 0, range
        // bad at slot 1.
        assert_eq!(flags[0], "0_1400000000_0_4");
        // NTRA: range good, H2S present at the same depth -> slot 8 bad.
        assert_eq!(flags[1], "0_0100000040_0_4");
        // TEMP_CTD: statistic good at slot 2, gradient has no previous
        // depth (slot 5 stays 0).
        assert_eq!(flags[3], "0_0010000000_0_1");

        // Re-deriving every total from the parts changes nothing.
        for row in runner.frame().rows() {
            let qc: crate::qc_flags::QcFlags = row.quality_flag_long.parse().unwrap();
            assert_eq!(qc.to_string(), row.quality_flag_long);
        }
    }

    #[test]
    fn test_total_flag_info_reports_contributing_fields() {
        let mut config = QcConfig::new();
        config.insert("AMON", range_entry(0.0, 60.0));

        let mut runner = QcRunner::new(frame(vec![sample("AMON", Some(200.0), 10.0)]), config);
        runner.run_automatic_qc().unwrap();
        let report = runner.total_flag_info().unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].total_automatic, Flag::Bad);
        assert_eq!(report[0].total_automatic_fields, vec![QcField::Range]);
        assert_eq!(report[0].fields_string(), "Range");
        assert!(report[0].total_automatic_info.starts_with("Range: BAD"));
    }
}
