//! Automatic quality control for oceanographic physical/chemical data.
//!
//! The input is a table of sample rows (one measured parameter per row);
//! the output is the same table with a four-part quality flag string per
//! row (`incoming_automatic_manual_total`) and a human-readable info
//! column per check. The automatic part holds one fixed position per
//! check, defined by [`flag_tuple::QcField`]; the battery in
//! [`runner::QcRunner`] runs the checks in that order and derives the
//! total verdict afterwards.

/// Common error types
pub mod error;
/// The quality flag alphabet and aggregation priority
pub mod flag;
/// The positional tuple of per-check flags
pub mod flag_tuple;
/// The four-part flag record and its string form
pub mod qc_flags;
/// The sample table and its flag column handling
pub mod frame;
/// Threshold configuration loading and lookup
pub mod config;
/// The automatic check algorithms
pub mod checks;
/// The orchestrator running the check battery
pub mod runner;
/// Visit-level metadata validation
pub mod metadata;
/// Console logging setup
pub mod logging;

#[cfg(test)]
mod test_utils;
