//! Common errors across the oceanqc-rs crate

/// Errors related to parsing and composing quality flags
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    /// The given value is not one of the recognized flag codes.
    #[error("'{0}' is not a valid quality flag")]
    InvalidFlag(String),
    /// One element of a flag tuple could not be converted to a flag.
    #[error("Flag tuple element at position {position} is invalid: '{value}'")]
    InvalidFlagElement { position: usize, value: String },
    /// A `quality_flag_long` string does not match the four-part
    /// `incoming_automatic_manual_total` grammar. This is treated as
    /// data corruption and always surfaces to the caller.
    #[error("'{0}' does not match the incoming_automatic_manual_total flag grammar")]
    MalformedQualityFlagLong(String),
}

impl FlagError {
    pub fn invalid_flag<S: Into<String>>(value: S) -> Self {
        Self::InvalidFlag(value.into())
    }

    pub fn invalid_element<S: Into<String>>(position: usize, value: S) -> Self {
        Self::InvalidFlagElement {
            position,
            value: value.into(),
        }
    }

    pub fn malformed<S: Into<String>>(value: S) -> Self {
        Self::MalformedQualityFlagLong(value.into())
    }
}

/// Errors raised while running the automatic QC battery.
///
/// Per-parameter check failures are absorbed into the info columns and do
/// not appear here; this type covers the structural failures that abort a
/// run (see the propagation policy in the crate docs).
#[derive(Debug, thiserror::Error)]
pub enum QcError {
    /// A flag string in the frame could not be parsed.
    #[error(transparent)]
    BadFlags(#[from] FlagError),
}
