//! Climatological statistics tables for the statistic check.
//!
//! Each configured parameter references one tab-separated file holding
//! the seasonal threshold bands per sea basin, month and depth layer.
//! The file is only read when the check first needs it, and at most once
//! per configuration instance.
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use error_stack::ResultExt;

use crate::config::ConfigError;

/// The column headers a statistics file must carry, in no particular order.
const REQUIRED_COLUMNS: [&str; 12] = [
    "sea_basin",
    "month",
    "min_depth",
    "max_depth",
    "min_range_value",
    "max_range_value",
    "flag1_lower",
    "flag1_upper",
    "flag2_lower",
    "flag2_upper",
    "flag3_lower",
    "flag3_upper",
];

/// One depth-layer row of a statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticRow {
    pub sea_basin: String,
    pub month: u32,
    pub min_depth: f64,
    pub max_depth: f64,
    pub thresholds: Thresholds,
}

/// The eight threshold fields the statistic check classifies against.
///
/// A lookup that finds no matching row returns all-NaN thresholds; the
/// check turns those into flag `0`, never into a silent GOOD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_range_value: f64,
    pub max_range_value: f64,
    pub flag1_lower: f64,
    pub flag1_upper: f64,
    pub flag2_lower: f64,
    pub flag2_upper: f64,
    pub flag3_lower: f64,
    pub flag3_upper: f64,
}

impl Thresholds {
    /// The no-match result: every field NaN.
    pub fn missing() -> Self {
        Self {
            min_range_value: f64::NAN,
            max_range_value: f64::NAN,
            flag1_lower: f64::NAN,
            flag1_upper: f64::NAN,
            flag2_lower: f64::NAN,
            flag2_upper: f64::NAN,
            flag3_lower: f64::NAN,
            flag3_upper: f64::NAN,
        }
    }

    /// Whether all six flag band endpoints are usable numbers.
    pub fn has_flag_bounds(&self) -> bool {
        !(self.flag1_lower.is_nan()
            || self.flag1_upper.is_nan()
            || self.flag2_lower.is_nan()
            || self.flag2_upper.is_nan()
            || self.flag3_lower.is_nan()
            || self.flag3_upper.is_nan())
    }
}

/// An in-memory statistics table for one parameter.
#[derive(Debug, Clone, Default)]
pub struct StatisticTable {
    rows: Vec<StatisticRow>,
}

impl StatisticTable {
    pub fn from_rows(rows: Vec<StatisticRow>) -> Self {
        Self { rows }
    }

    /// Read a tab-separated statistics file.
    ///
    /// The first line must name the columns; rows may come in any order.
    /// Unparseable numeric cells become NaN (and therefore never match or
    /// classify), matching how gaps are encoded in the delivered tables.
    pub fn load(path: &Path) -> error_stack::Result<Self, ConfigError> {
        let file = std::fs::File::open(path)
            .change_context_lazy(|| ConfigError::could_not_read(path))?;
        let reader = std::io::BufReader::new(file);
        let mut lines = reader.lines().enumerate();

        let (_, header) = lines
            .next()
            .ok_or_else(|| ConfigError::bad_format(path, "file is empty"))?;
        let header =
            header.change_context_lazy(|| ConfigError::could_not_read(path))?;
        let colnames: Vec<&str> = header.trim_end().split('\t').collect();

        let mut col_idx = [0usize; REQUIRED_COLUMNS.len()];
        for (i, wanted) in REQUIRED_COLUMNS.iter().enumerate() {
            col_idx[i] = colnames
                .iter()
                .position(|c| c == wanted)
                .ok_or_else(|| ConfigError::missing_column(path, *wanted))?;
        }

        let mut rows = Vec::new();
        for (iline, line) in lines {
            let line = line
                .change_context_lazy(|| ConfigError::could_not_read(path))
                .attach_printable_lazy(|| format!("failed to read line {}", iline + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.trim_end().split('\t').collect();
            let cell = |i: usize| cells.get(col_idx[i]).copied().unwrap_or("");

            let month: u32 = cell(1).trim().parse().map_err(|_| {
                ConfigError::bad_format(
                    path,
                    format!("line {}: month '{}' is not an integer", iline + 1, cell(1)),
                )
            })?;

            rows.push(StatisticRow {
                sea_basin: cell(0).to_string(),
                month,
                min_depth: nan_float(cell(2)),
                max_depth: nan_float(cell(3)),
                thresholds: Thresholds {
                    min_range_value: nan_float(cell(4)),
                    max_range_value: nan_float(cell(5)),
                    flag1_lower: nan_float(cell(6)),
                    flag1_upper: nan_float(cell(7)),
                    flag2_lower: nan_float(cell(8)),
                    flag2_upper: nan_float(cell(9)),
                    flag3_lower: nan_float(cell(10)),
                    flag3_upper: nan_float(cell(11)),
                },
            });
        }

        Ok(Self { rows })
    }

    /// The thresholds for a sample at `depth` in `sea_basin` during
    /// `month`, or all-NaN when no row matches.
    ///
    /// The depth band is half-open: `min_depth <= depth < max_depth`.
    pub fn get_thresholds(&self, sea_basin: &str, depth: f64, month: u32) -> Thresholds {
        let mut matches = self.rows.iter().filter(|row| {
            row.sea_basin == sea_basin
                && row.month == month
                && row.min_depth <= depth
                && row.max_depth > depth
        });

        let Some(first) = matches.next() else {
            return Thresholds::missing();
        };
        let extra = matches.count();
        if extra > 0 {
            log::warn!(
                "{} additional statistic rows matched sea_basin={sea_basin}, depth={depth}, \
                 month={month}; using the first match",
                extra
            );
        }
        first.thresholds
    }
}

/// A statistic-check configuration entry: a file reference whose table
/// is loaded lazily and memoized.
#[derive(Debug)]
pub struct StatisticCheck {
    path: PathBuf,
    table: OnceLock<StatisticTable>,
}

impl StatisticCheck {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    /// Build an entry around an already-materialized table. Used by
    /// tests and by callers that assemble statistics programmatically.
    pub fn preloaded(table: StatisticTable) -> Self {
        let lock = OnceLock::new();
        lock.set(table).expect("fresh OnceLock accepts a value");
        Self {
            path: PathBuf::new(),
            table: lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The statistics table, reading the file on first access.
    pub fn data(&self) -> error_stack::Result<&StatisticTable, ConfigError> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let loaded = StatisticTable::load(&self.path)?;
        Ok(self.table.get_or_init(|| loaded))
    }

    /// Convenience lookup through the lazily loaded table.
    pub fn get_thresholds(
        &self,
        sea_basin: &str,
        depth: f64,
        month: u32,
    ) -> error_stack::Result<Thresholds, ConfigError> {
        Ok(self.data()?.get_thresholds(sea_basin, depth, month))
    }
}

/// Parse a numeric cell, coercing anything unparseable to NaN.
fn nan_float(cell: &str) -> f64 {
    cell.trim().parse().unwrap_or(f64::NAN)
}
