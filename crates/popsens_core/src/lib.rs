//! Cohort-component population projection with Sobol sensitivity analysis
//!
//! This crate projects a country's age-and-sex-structured population forward
//! in five-year periods and measures how long-horizon totals depend on
//! uncertain inputs. It supports:
//! - Baseline survival and birth rates derived from two consecutive pyramids
//! - An allocation-free projection engine with optional legacy accounting
//! - Parameter ranges from fixed tables or from historical rate spreads
//! - Saltelli sampling on a Sobol sequence and parallel batch evaluation
//! - First-order and total-order indices with bootstrap confidence intervals
//!
//! # Example
//!
//! ```ignore
//! use popsens_core::{CountryInput, SensitivityConfig, analyze_country};
//!
//! let input = CountryInput {
//!     country: "Iceland",
//!     previous: &previous,
//!     current: &current,
//!     bounds: &ranges,
//! };
//! let report = analyze_country(input, &SensitivityConfig::default())?;
//! for checkpoint in &report.scenarios[0].checkpoints {
//!     println!("{} years: S1 sum {:.3}", checkpoint.years, checkpoint.s1_sum());
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod bounds;
pub mod error;
pub mod projection;
pub mod rates;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{
    AnalysisOptions, CountryInput, ParameterSpace, SensitivityConfig, analyze, analyze_country,
    evaluate, saltelli_sample,
};
pub use bounds::{BoundsProvider, FixedBounds, HistoricalBounds};
pub use error::{AnalysisError, ConfigError, DataError, Result};
pub use projection::{Projection, ProjectionOptions, project, trajectory};
pub use rates::derive_baseline_rates;
