//! The four-part quality flag record attached to every sample row.
//!
//! The external form is a single string `incoming_automatic_manual_total`
//! where `automatic` is one character per check slot. The `total` part is
//! always derived; it is recomputed whenever the record is rendered, so a
//! parsed-and-rerendered string carries a consistent total even if the
//! incoming data did not.
use std::fmt::Display;
use std::str::FromStr;

use crate::error::FlagError;
use crate::flag::Flag;
use crate::flag_tuple::{FlagTuple, QcField};

/// Composite QC state for one sample row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QcFlags {
    incoming: Flag,
    automatic: FlagTuple,
    manual: Flag,
}

impl QcFlags {
    /// A record with every slot set to `0` and the automatic tuple at
    /// its full default length.
    pub fn new() -> Self {
        Self {
            incoming: Flag::NoQcPerformed,
            automatic: FlagTuple::new(),
            manual: Flag::NoQcPerformed,
        }
    }

    pub fn with_parts(incoming: Flag, automatic: FlagTuple, manual: Flag) -> Self {
        Self {
            incoming,
            automatic,
            manual,
        }
    }

    pub fn incoming(&self) -> Flag {
        self.incoming
    }

    pub fn set_incoming(&mut self, flag: Flag) {
        self.incoming = flag;
    }

    pub fn automatic(&self) -> &FlagTuple {
        &self.automatic
    }

    pub fn set_automatic(&mut self, automatic: FlagTuple) {
        self.automatic = automatic;
    }

    /// The automatic flag in the slot belonging to `field`.
    pub fn get_field(&self, field: QcField) -> Flag {
        self.automatic.get_field(field)
    }

    pub fn set_field(&mut self, field: QcField, flag: Flag) {
        self.automatic.set_field(field, flag);
    }

    pub fn manual(&self) -> Flag {
        self.manual
    }

    pub fn set_manual(&mut self, flag: Flag) {
        self.manual = flag;
    }

    /// The aggregated verdict for the row.
    ///
    /// A manual flag always wins when one has been set. Otherwise the
    /// priority-worst of the incoming flag and all automatic flags wins,
    /// with `0` treated as absence; if nothing has been flagged at all
    /// the total is `0`.
    pub fn total(&self) -> Flag {
        if self.manual != Flag::NoQcPerformed {
            return self.manual;
        }
        Flag::worst_of(std::iter::once(self.incoming).chain(self.automatic.iter()))
    }

    /// The priority-worst automatic flag, ignoring the incoming and
    /// manual parts.
    pub fn total_automatic(&self) -> Flag {
        Flag::worst_of(self.automatic.iter())
    }

    /// The fields whose automatic flag equals [`QcFlags::total_automatic`].
    ///
    /// Empty when no automatic check has produced a verdict. Slots beyond
    /// the defined fields are ignored.
    pub fn total_automatic_source(&self) -> Vec<QcField> {
        let total = self.total_automatic();
        if total == Flag::NoQcPerformed {
            return Vec::new();
        }
        self.automatic
            .iter()
            .enumerate()
            .filter(|(_, flag)| *flag == total)
            .filter_map(|(i, _)| QcField::from_index(i))
            .collect()
    }
}

impl Default for QcFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for QcFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.incoming,
            self.automatic,
            self.manual,
            self.total()
        )
    }
}

impl FromStr for QcFlags {
    type Err = FlagError;

    /// Parse the four-part string form. The empty string yields the
    /// default record. The trailing total part must be present and
    /// parseable but its value is discarded, since total is derived.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::new());
        }

        let mut parts = s.split('_');
        let (incoming, automatic, manual, total) = match (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            (Some(i), Some(a), Some(m), Some(t), None) => (i, a, m, t),
            _ => return Err(FlagError::malformed(s)),
        };

        let incoming = Flag::parse(incoming).map_err(|_| FlagError::malformed(s))?;
        let automatic: FlagTuple = automatic.parse().map_err(|_| FlagError::malformed(s))?;
        let manual = Flag::parse(manual).map_err(|_| FlagError::malformed(s))?;
        Flag::parse(total).map_err(|_| FlagError::malformed(s))?;

        Ok(Self {
            incoming,
            automatic,
            manual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_record() {
        let qc = QcFlags::new();
        assert_eq!(qc.to_string(), "0_0000000000_0_0");
        assert_eq!("".parse::<QcFlags>().unwrap(), qc);
    }

    #[rstest]
    #[case("0_0000000000_0_0")]
    #[case("1_0040000000_0_4")]
    #[case("1_00Q0000000_0_Q")]
    #[case("2_1111111111_0_2")]
    #[case("0_0000000000_5_5")]
    fn test_string_round_trip(#[case] s: &str) {
        let qc: QcFlags = s.parse().unwrap();
        assert_eq!(qc.to_string(), s);
    }

    #[rstest]
    #[case("not a flag string")]
    #[case("0_000")]
    #[case("0_0000000000_0")]
    #[case("0_0000000000_0_0_0")]
    #[case("x_0000000000_0_0")]
    #[case("0_00x0000000_0_0")]
    fn test_malformed_strings_are_fatal(#[case] s: &str) {
        assert!(matches!(
            s.parse::<QcFlags>(),
            Err(FlagError::MalformedQualityFlagLong(_))
        ));
    }

    #[test]
    fn test_manual_flag_dominates_total() {
        let mut qc: QcFlags = "1_0040000000_0_4".parse().unwrap();
        assert_eq!(qc.total(), Flag::Bad);

        qc.set_manual(Flag::ProbablyGood);
        assert_eq!(qc.total(), Flag::ProbablyGood);
        assert_eq!(qc.to_string(), "1_0040000000_2_2");
    }

    #[test]
    fn test_total_is_priority_worst_of_incoming_and_automatic() {
        // Missing (9) outranks bad-correctable (3), bad (4) outranks both.
        let qc: QcFlags = "3_0090000000_0_0".parse().unwrap();
        assert_eq!(qc.total(), Flag::Missing);

        let qc: QcFlags = "3_0090400000_0_0".parse().unwrap();
        assert_eq!(qc.total(), Flag::Bad);

        // Incoming alone can carry the total.
        let qc: QcFlags = "2_0000000000_0_0".parse().unwrap();
        assert_eq!(qc.total(), Flag::ProbablyGood);
    }

    #[test]
    fn test_total_empty_candidates_yield_no_qc() {
        let qc: QcFlags = "0_0000000000_0_0".parse().unwrap();
        assert_eq!(qc.total(), Flag::NoQcPerformed);
    }

    #[test]
    fn test_setters_refresh_total_in_string_form() {
        let mut qc = QcFlags::new();
        qc.set_field(QcField::Range, Flag::Bad);
        assert_eq!(qc.to_string(), "0_0400000000_0_4");

        qc.set_incoming(Flag::Good);
        assert_eq!(qc.total(), Flag::Bad);
        qc.set_field(QcField::Range, Flag::Good);
        assert_eq!(qc.to_string(), "1_0100000000_0_1");
    }

    #[test]
    fn test_total_automatic_and_source() {
        let qc: QcFlags = "4_0390000090_0_0".parse().unwrap();
        assert_eq!(qc.total_automatic(), Flag::Missing);
        assert_eq!(
            qc.total_automatic_source(),
            vec![QcField::Statistic, QcField::Dependency]
        );

        let clean = QcFlags::new();
        assert_eq!(clean.total_automatic(), Flag::NoQcPerformed);
        assert!(clean.total_automatic_source().is_empty());
    }

    #[test]
    fn test_parse_accepts_short_automatic_part() {
        // Older deliveries carry fewer check slots; the tuple keeps
        // whatever length it was given and grows on assignment.
        let qc: QcFlags = "1_0000000_0_1".parse().unwrap();
        assert_eq!(qc.automatic().len(), 7);
        assert_eq!(qc.total(), Flag::Good);
    }
}
