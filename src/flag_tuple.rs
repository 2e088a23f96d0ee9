//! The positional tuple of automatic check flags.
//!
//! Each automatic check owns a fixed slot in the flag string; the slot
//! order is given by [`QcField`] and must never change, since downstream
//! consumers address the concatenated string by position.
use std::fmt::Display;
use std::str::FromStr;

use strum::IntoEnumIterator;

use crate::error::FlagError;
use crate::flag::Flag;

/// Flag positions in the [`FlagTuple`], in declaration order.
///
/// The discriminant of each variant is the index of the check's slot in
/// the automatic part of `quality_flag_long`. The declaration order is
/// also the execution order of the check battery: the spike check reads
/// the total flags written by earlier checks, and the dependency check
/// reads other parameters' full flag strings, so reordering changes
/// results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
pub enum QcField {
    QuantificationLimit = 0,
    Range = 1,
    Statistic = 2,
    RepeatedValue = 3,
    Stability = 4,
    Gradient = 5,
    Spike = 6,
    Consistency = 7,
    H2s = 8,
    Dependency = 9,
}

impl QcField {
    /// Number of defined fields, i.e. the default length of a [`FlagTuple`].
    pub const COUNT: usize = 10;

    /// The slot index of this field in the automatic flag tuple.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The field whose slot is `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// The configuration category that feeds this field's check,
    /// e.g. `range_check` for [`QcField::Range`].
    pub fn category(self) -> &'static str {
        match self {
            QcField::QuantificationLimit => "quantificationlimit_check",
            QcField::Range => "range_check",
            QcField::Statistic => "statistic_check",
            QcField::RepeatedValue => "repeatedvalue_check",
            QcField::Stability => "stability_check",
            QcField::Gradient => "gradient_check",
            QcField::Spike => "spike_check",
            QcField::Consistency => "consistency_check",
            QcField::H2s => "h2s_check",
            QcField::Dependency => "dependency_check",
        }
    }

    /// Name of the ephemeral per-check flag column, e.g. `AUTO_QC_Range`.
    pub fn column_name(self) -> String {
        format!("AUTO_QC_{self}")
    }

    /// Name of the persistent per-check info column, e.g. `info_AUTO_QC_Range`.
    pub fn info_column_name(self) -> String {
        format!("info_AUTO_QC_{self}")
    }
}

/// A growable sequence of flags addressed by [`QcField`] position.
///
/// Behaves like a fixed tuple in all ways but one: assigning at an index
/// beyond the current length grows the tuple, filling the intermediate
/// positions with [`Flag::NoQcPerformed`]. Elements can never be removed,
/// as that would shift the meaning of every later position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagTuple(Vec<Flag>);

impl FlagTuple {
    /// A tuple with one `0` slot per defined [`QcField`].
    pub fn new() -> Self {
        Self(vec![Flag::NoQcPerformed; QcField::COUNT])
    }

    /// An empty tuple; mostly useful in tests exercising growth.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, index: usize) -> Option<Flag> {
        self.0.get(index).copied()
    }

    /// The flag in the slot belonging to `field`.
    ///
    /// Returns `NoQcPerformed` when the tuple is shorter than the
    /// field's position.
    pub fn get_field(&self, field: QcField) -> Flag {
        self.get(field.index()).unwrap_or(Flag::NoQcPerformed)
    }

    /// Assign `flag` at `index`, growing the tuple with `0` fills if it
    /// is currently shorter than `index + 1`.
    pub fn set(&mut self, index: usize, flag: Flag) {
        if index >= self.0.len() {
            self.0.resize(index + 1, Flag::NoQcPerformed);
        }
        self.0[index] = flag;
    }

    pub fn set_field(&mut self, field: QcField, flag: Flag) {
        self.set(field.index(), flag);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        self.0.iter().copied()
    }
}

impl Default for FlagTuple {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Flag>> for FlagTuple {
    fn from(flags: Vec<Flag>) -> Self {
        Self(flags)
    }
}

impl FromIterator<Flag> for FlagTuple {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for FlagTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for flag in self.iter() {
            write!(f, "{flag}")?;
        }
        Ok(())
    }
}

impl FromStr for FlagTuple {
    type Err = FlagError;

    /// Parse a tuple from the concatenated one-character codes.
    ///
    /// Any character outside the flag alphabet fails with
    /// [`FlagError::InvalidFlagElement`] naming the offending position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(i, c)| {
                Flag::from_char(c).map_err(|_| FlagError::invalid_element(i, c.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_positions_are_stable() {
        // The positional contract: slot i always denotes QcField(i).
        for (i, field) in QcField::iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(QcField::from_index(i), Some(field));
        }
        assert_eq!(QcField::iter().count(), QcField::COUNT);
        assert_eq!(QcField::from_index(QcField::COUNT), None);
    }

    #[test]
    fn test_set_grows_with_zero_fill() {
        let mut tuple = FlagTuple::empty();
        tuple.set(3, Flag::Bad);

        assert_eq!(tuple.len(), 4);
        assert_eq!(tuple.get(0), Some(Flag::NoQcPerformed));
        assert_eq!(tuple.get(1), Some(Flag::NoQcPerformed));
        assert_eq!(tuple.get(2), Some(Flag::NoQcPerformed));
        assert_eq!(tuple.get(3), Some(Flag::Bad));
    }

    #[test]
    fn test_set_within_bounds_keeps_length() {
        let mut tuple = FlagTuple::new();
        tuple.set_field(QcField::Range, Flag::Good);
        assert_eq!(tuple.len(), QcField::COUNT);
        assert_eq!(tuple.get_field(QcField::Range), Flag::Good);
        assert_eq!(tuple.get_field(QcField::Spike), Flag::NoQcPerformed);
    }

    #[test]
    fn test_string_round_trip() {
        let tuple: FlagTuple = "01Q4B00A09".parse().unwrap();
        assert_eq!(tuple.to_string(), "01Q4B00A09");
        assert_eq!(tuple.get(2), Some(Flag::BelowQuantification));
        assert_eq!(tuple.get(4), Some(Flag::Nominal));
    }

    #[test]
    fn test_invalid_element_names_position() {
        let err = "01x4".parse::<FlagTuple>().unwrap_err();
        assert_eq!(err, FlagError::invalid_element(2, "x"));
    }

    #[test]
    fn test_default_tuple_is_all_zero() {
        let tuple = FlagTuple::new();
        assert_eq!(tuple.to_string(), "0000000000");
    }
}
