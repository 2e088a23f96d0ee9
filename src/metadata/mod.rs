//! Visit-level metadata validation.
//!
//! Separate from the per-sample check battery: these validators look at
//! the columns that should be constant over one station cast (date and
//! time, position, bottom depth, and the other header fields) and
//! produce one flag per [`MetadataQcField`] on the [`Visit`], together
//! with a log of per-column messages explaining each failure.
use strum::IntoEnumIterator;

pub mod common_values;
pub mod date;
pub mod position;
pub mod visit;
pub mod wadep;

pub use visit::{Visit, VisitError};

/// The metadata QC categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
pub enum MetadataQcField {
    Wadep,
    DateAndTime,
    Position,
    CommonValues,
}

/// Verdicts for metadata checks; there is no graded scale here, a visit
/// header is either consistent or it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataFlag {
    #[default]
    NoQcPerformed,
    GoodData,
    BadData,
}

/// Errors from the metadata QC layer.
#[derive(Debug, thiserror::Error)]
pub enum MetadataQcError {
    #[error(transparent)]
    Visit(#[from] VisitError),
}

/// Runs every metadata validator over one visit.
pub struct MetadataQc {
    visit: Visit,
}

impl MetadataQc {
    pub fn new(visit: Visit) -> Self {
        Self { visit }
    }

    pub fn visit(&self) -> &Visit {
        &self.visit
    }

    pub fn into_visit(self) -> Visit {
        self.visit
    }

    /// Run all validators. Each writes its own flag and log entries on
    /// the visit; a validator that cannot run leaves its flag at
    /// `NoQcPerformed`.
    pub fn run_qc(&mut self) {
        for field in MetadataQcField::iter() {
            match field {
                MetadataQcField::Wadep => wadep::check(&mut self.visit),
                MetadataQcField::DateAndTime => date::check(&mut self.visit),
                MetadataQcField::Position => position::check(&mut self.visit),
                MetadataQcField::CommonValues => common_values::check(&mut self.visit),
            }
        }
    }
}
