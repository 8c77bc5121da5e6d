//! Variance-based sensitivity analysis of projected population totals.
//!
//! The analysis runs in four stages, each usable on its own:
//!
//! ```ignore
//! use popsens_core::analysis::{ParameterSpace, saltelli_sample, evaluate, analyze};
//!
//! // Sample the parameter space (N × (2D + 2) rows)
//! let space = ParameterSpace::standard(&bounds)?;
//! let matrix = saltelli_sample(&space, 2048, 2048)?;
//!
//! // Project every row and keep the checkpoint totals
//! let outcomes = evaluate(&current, &baseline, &space, &matrix, &EvaluationPlan::default())?;
//!
//! // Estimate indices per checkpoint
//! let indices = analyze(&space, &outcomes.series[0], &AnalysisOptions::default())?;
//! ```
//!
//! [`analyze_country`] chains them for both scenarios of one country.

mod config;
mod estimator;
mod evaluator;
mod pipeline;
mod sampler;

pub use config::*;
pub use estimator::*;
pub use evaluator::*;
pub use pipeline::*;
pub use sampler::*;
