//! The quality flag alphabet and its aggregation priority.
//!
//! Every per-sample verdict in the system is one of the thirteen codes
//! defined here. The codes follow the national datahost convention: the
//! digits `0`-`9` plus the letters `Q`, `B` and `A`. Code `0` means that
//! no QC has been performed; during aggregation it is treated as the
//! absence of a verdict, never as a verdict itself.
use std::fmt::Display;
use std::str::FromStr;

use crate::error::FlagError;

/// A single quality flag code.
///
/// [`FromStr`] and [`Display`] convert to and from the one-character
/// external representation. Use [`Flag::parse`] for the liberal parser
/// that also accepts empty input and bare integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flag {
    /// `0` - no QC performed
    #[default]
    NoQcPerformed,
    /// `1` - good data
    Good,
    /// `2` - probably good data
    ProbablyGood,
    /// `3` - bad but correctable data
    BadCorrectable,
    /// `4` - bad data
    Bad,
    /// `5` - value changed
    Changed,
    /// `6` - value below detection limit
    BelowDetection,
    /// `7` - value in excess
    Excess,
    /// `8` - interpolated value
    Interpolated,
    /// `9` - missing value
    Missing,
    /// `Q` - value below limit of quantification
    BelowQuantification,
    /// `B` - nominal value
    Nominal,
    /// `A` - uncertain value
    Uncertain,
}

/// All flags ordered from worst to best.
///
/// The position in this list is the flag's priority rank; aggregation
/// takes the minimum rank among candidates. `NoQcPerformed` is last so
/// that it never wins over an actual verdict.
const PRIORITY: [Flag; 13] = [
    Flag::Bad,
    Flag::Missing,
    Flag::Interpolated,
    Flag::Excess,
    Flag::Nominal,
    Flag::Uncertain,
    Flag::BelowQuantification,
    Flag::BelowDetection,
    Flag::Changed,
    Flag::BadCorrectable,
    Flag::ProbablyGood,
    Flag::Good,
    Flag::NoQcPerformed,
];

impl Flag {
    /// The one-character external code for this flag.
    pub fn as_char(self) -> char {
        match self {
            Flag::NoQcPerformed => '0',
            Flag::Good => '1',
            Flag::ProbablyGood => '2',
            Flag::BadCorrectable => '3',
            Flag::Bad => '4',
            Flag::Changed => '5',
            Flag::BelowDetection => '6',
            Flag::Excess => '7',
            Flag::Interpolated => '8',
            Flag::Missing => '9',
            Flag::BelowQuantification => 'Q',
            Flag::Nominal => 'B',
            Flag::Uncertain => 'A',
        }
    }

    /// Convert a single character code to a flag.
    pub fn from_char(c: char) -> Result<Self, FlagError> {
        match c {
            '0' => Ok(Flag::NoQcPerformed),
            '1' => Ok(Flag::Good),
            '2' => Ok(Flag::ProbablyGood),
            '3' => Ok(Flag::BadCorrectable),
            '4' => Ok(Flag::Bad),
            '5' => Ok(Flag::Changed),
            '6' => Ok(Flag::BelowDetection),
            '7' => Ok(Flag::Excess),
            '8' => Ok(Flag::Interpolated),
            '9' => Ok(Flag::Missing),
            'Q' => Ok(Flag::BelowQuantification),
            'B' => Ok(Flag::Nominal),
            'A' => Ok(Flag::Uncertain),
            other => Err(FlagError::invalid_flag(other.to_string())),
        }
    }

    /// Liberal parser for flag values as they occur in delivered data.
    ///
    /// Accepts the empty string (interpreted as [`Flag::NoQcPerformed`]),
    /// a one-character code, or an integer equal to one of the digit
    /// codes. Everything else fails with [`FlagError::InvalidFlag`].
    pub fn parse(value: &str) -> Result<Self, FlagError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Flag::NoQcPerformed);
        }

        let mut chars = value.chars();
        let first = chars.next().expect("non-empty string has a first char");
        if chars.next().is_none() {
            return Self::from_char(first);
        }

        // Multi-character input is only acceptable if it is an integer
        // spelling of a digit code, e.g. "04" for flag 4.
        let as_int: u32 = value
            .parse()
            .map_err(|_| FlagError::invalid_flag(value))?;
        if as_int <= 9 {
            Self::from_char(char::from_digit(as_int, 10).expect("single digit"))
        } else {
            Err(FlagError::invalid_flag(value))
        }
    }

    /// The index of this flag in the worst-to-best priority list.
    ///
    /// Lower rank = worse verdict. Used for min-by-priority aggregation.
    pub fn priority_rank(self) -> usize {
        PRIORITY
            .iter()
            .position(|f| *f == self)
            .expect("every flag has a priority rank")
    }

    /// The priority-worst flag among `flags`, ignoring [`Flag::NoQcPerformed`].
    ///
    /// Returns `NoQcPerformed` when the iterator yields no actual verdict.
    pub fn worst_of<I: IntoIterator<Item = Flag>>(flags: I) -> Flag {
        flags
            .into_iter()
            .filter(|f| *f != Flag::NoQcPerformed)
            .min_by_key(|f| f.priority_rank())
            .unwrap_or(Flag::NoQcPerformed)
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Flag {
    type Err = FlagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
