//! Typed threshold entries, one kind per check category.
//!
//! The YAML files bind these to parameter names; see the module docs of
//! [`crate::config`] for the file layout. All thresholds are plain
//! numbers and immutable after load.
use serde::Deserialize;

use crate::config::statistic::StatisticCheck;
use crate::flag_tuple::QcField;

/// Quantification limit thresholds: the global fallback limit used when
/// a row carries no `LMQNT_VAL` of its own.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QuantificationLimitCheck {
    pub limit: f64,
}

/// Min/max bounds for the plain range check.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RangeCheck {
    pub min_range_value: f64,
    pub max_range_value: f64,
}

/// The sentinel difference that marks a value as identical to the one
/// at the depth above (0 in the shipped configuration).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RepeatedValueCheck {
    pub repeated_value: f64,
}

/// Decrease bands for the density stability check, ordered
/// `bad_decrease < probably_bad_decrease < probably_good_decrease`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StabilityCheck {
    pub bad_decrease: f64,
    pub probably_bad_decrease: f64,
    pub probably_good_decrease: f64,
}

/// Allowed per-meter change bounds for the gradient check.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GradientCheck {
    pub allowed_decrease: f64,
    pub allowed_increase: f64,
}

/// Spike magnitude thresholds and the rate-of-change gate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpikeCheck {
    pub threshold_high: f64,
    pub threshold_low: f64,
    pub rate_of_change: f64,
}

/// Difference bounds for the groupwise-sum consistency check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsistencyCheck {
    /// Parameters whose values are summed per (visit, depth) group.
    pub parameter_list: Vec<String>,
    pub good_lower: f64,
    pub good_upper: f64,
    pub max_lower: f64,
    pub max_upper: f64,
}

/// The flag codes that make the H2S check preserve the target row's
/// existing verdict, as a regex alternation (typically `6`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct H2sCheck {
    pub skip_flag: String,
}

/// Parameters whose flags a dependent parameter inherits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DependencyCheck {
    pub parameter_list: Vec<String>,
}

/// One parameter's configuration within some category.
#[derive(Debug)]
pub enum CheckEntry {
    QuantificationLimit(QuantificationLimitCheck),
    Range(RangeCheck),
    Statistic(StatisticCheck),
    RepeatedValue(RepeatedValueCheck),
    Stability(StabilityCheck),
    Gradient(GradientCheck),
    Spike(SpikeCheck),
    Consistency(ConsistencyCheck),
    H2s(H2sCheck),
    Dependency(DependencyCheck),
}

impl CheckEntry {
    /// The check field this entry kind feeds. The mapping is static; the
    /// registry relies on it to place loaded entries under the right
    /// category.
    pub fn field(&self) -> QcField {
        match self {
            CheckEntry::QuantificationLimit(_) => QcField::QuantificationLimit,
            CheckEntry::Range(_) => QcField::Range,
            CheckEntry::Statistic(_) => QcField::Statistic,
            CheckEntry::RepeatedValue(_) => QcField::RepeatedValue,
            CheckEntry::Stability(_) => QcField::Stability,
            CheckEntry::Gradient(_) => QcField::Gradient,
            CheckEntry::Spike(_) => QcField::Spike,
            CheckEntry::Consistency(_) => QcField::Consistency,
            CheckEntry::H2s(_) => QcField::H2s,
            CheckEntry::Dependency(_) => QcField::Dependency,
        }
    }

    /// The configuration category this entry belongs to.
    pub fn category(&self) -> &'static str {
        self.field().category()
    }
}
