//! Command-line front end for population sensitivity analysis
//!
//! Loads population pyramids and parameter ranges from CSV, runs the Saltelli
//! sensitivity analysis of `popsens_core` for every selected country and writes
//! JSON and CSV reports. Countries that fail are logged and listed in the
//! report without stopping the run.

#![warn(clippy::all)]

// ============================================================================
// Input modules
// ============================================================================

pub mod config;
pub mod data;

// ============================================================================
// Run and output modules
// ============================================================================

pub mod logging;
pub mod report;
pub mod runner;
pub mod util;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{RangeSource, RunConfig};
pub use data::{PopulationTable, RangesTable, StorageError};
pub use logging::init_logging;
pub use report::{RunReport, write_reports};
pub use runner::{CountryFailure, CountryResult, Ranges, RunOutcome, run};
