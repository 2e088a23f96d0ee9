//! The configuration registry binding parameters to check thresholds.
//!
//! Each check category reads its thresholds from one YAML file in the
//! configuration directory; the file stem is the category name, e.g.
//! `range_check.yaml`. Every file maps parameter names to a `global`
//! entry of the category's threshold type:
//!
//! ```yaml
//! AMON:
//!   global:
//!     min_range_value: 0.0
//!     max_range_value: 60.0
//! ```
//!
//! `statistic_check.yaml` is the exception: its entries reference one
//! tab-separated statistics file per parameter, resolved relative to the
//! configuration directory and loaded lazily on first use:
//!
//! ```yaml
//! TEMP_CTD:
//!   filepath: statistic_check_data/TEMP_CTD.txt
//! ```
//!
//! All entries are immutable once loaded.
use std::path::{Path, PathBuf};

use error_stack::ResultExt;
use indexmap::IndexMap;
use serde::Deserialize;

pub mod entries;
pub mod statistic;

pub use entries::{
    CheckEntry, ConsistencyCheck, DependencyCheck, GradientCheck, H2sCheck,
    QuantificationLimitCheck, RangeCheck, RepeatedValueCheck, SpikeCheck, StabilityCheck,
};
pub use statistic::{StatisticCheck, StatisticRow, StatisticTable, Thresholds};

use crate::flag_tuple::QcField;
use strum::IntoEnumIterator;

/// Possible errors while loading or querying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration or statistics file could not be opened or read.
    #[error("Could not read {}", .path.display())]
    CouldNotRead { path: PathBuf },

    /// A file was readable but its content did not have the expected shape.
    #[error("Bad format in {}: {reason}", .path.display())]
    BadFormat { path: PathBuf, reason: String },

    /// A statistics file is missing one of its mandatory columns.
    #[error("Missing column '{column}' in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl ConfigError {
    pub fn could_not_read<P: Into<PathBuf>>(path: P) -> Self {
        Self::CouldNotRead { path: path.into() }
    }

    pub fn bad_format<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::BadFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_column<P: Into<PathBuf>, S: Into<String>>(path: P, column: S) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }
}

/// Wrapper for the `global` level in the per-parameter YAML entries.
#[derive(Debug, Deserialize)]
struct GlobalEntry<T> {
    global: T,
}

/// File reference inside `statistic_check.yaml`.
#[derive(Debug, Deserialize)]
struct StatisticFileRef {
    filepath: PathBuf,
}

/// The registry of all per-check, per-parameter threshold entries.
#[derive(Debug, Default)]
pub struct QcConfig {
    categories: IndexMap<String, IndexMap<String, CheckEntry>>,
}

impl QcConfig {
    /// An empty registry; populate it with [`QcConfig::insert`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every recognized category file found in `config_dir`.
    ///
    /// A category without a file is simply absent from the registry;
    /// that is a normal configuration, not an error.
    pub fn load(config_dir: &Path) -> error_stack::Result<Self, ConfigError> {
        let mut config = Self::new();

        for field in QcField::iter() {
            let category = field.category();
            let path = config_dir.join(format!("{category}.yaml"));
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(&path)
                .change_context_lazy(|| ConfigError::could_not_read(&path))?;
            let parameters = parse_category(field, &text, config_dir)
                .change_context_lazy(|| {
                    ConfigError::bad_format(&path, "could not deserialize the category entries")
                })
                .attach_printable_lazy(|| {
                    format!("error deserializing the {category} configuration")
                })?;
            config.categories.insert(category.to_string(), parameters);
        }

        Ok(config)
    }

    /// Register one entry under the category its kind belongs to.
    pub fn insert<S: Into<String>>(&mut self, parameter: S, entry: CheckEntry) {
        self.categories
            .entry(entry.category().to_string())
            .or_default()
            .insert(parameter.into(), entry);
    }

    /// The category names present in the registry.
    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.keys().map(String::as_str)
    }

    /// The parameters configured under `category`, in file order.
    pub fn parameters(&self, category: &str) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|params| params.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The entry for `parameter` under `category`, if one is configured.
    pub fn get(&self, category: &str, parameter: &str) -> Option<&CheckEntry> {
        self.categories.get(category)?.get(parameter)
    }
}

/// Parse one category file's text into its typed entries.
fn parse_category(
    field: QcField,
    text: &str,
    config_dir: &Path,
) -> Result<IndexMap<String, CheckEntry>, serde_yaml::Error> {
    fn global<T>(
        text: &str,
        wrap: impl Fn(T) -> CheckEntry,
    ) -> Result<IndexMap<String, CheckEntry>, serde_yaml::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let raw: IndexMap<String, GlobalEntry<T>> = serde_yaml::from_str(text)?;
        Ok(raw
            .into_iter()
            .map(|(param, entry)| (param, wrap(entry.global)))
            .collect())
    }

    match field {
        QcField::QuantificationLimit => global(text, CheckEntry::QuantificationLimit),
        QcField::Range => global(text, CheckEntry::Range),
        QcField::RepeatedValue => global(text, CheckEntry::RepeatedValue),
        QcField::Stability => global(text, CheckEntry::Stability),
        QcField::Gradient => global(text, CheckEntry::Gradient),
        QcField::Spike => global(text, CheckEntry::Spike),
        QcField::Consistency => global(text, CheckEntry::Consistency),
        QcField::H2s => global(text, CheckEntry::H2s),
        QcField::Dependency => global(text, CheckEntry::Dependency),
        QcField::Statistic => {
            let raw: IndexMap<String, StatisticFileRef> = serde_yaml::from_str(text)?;
            Ok(raw
                .into_iter()
                .map(|(param, file_ref)| {
                    let path = config_dir.join(file_ref.filepath);
                    (param, CheckEntry::Statistic(StatisticCheck::new(path)))
                })
                .collect())
        }
    }
}
