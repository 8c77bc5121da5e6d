//! Integration tests for the projection and sensitivity pipeline
//!
//! Tests are organized by topic:
//! - `fixtures` - Reference pyramids shared by the topic modules
//! - `projection` - Engine totals against reference figures and conservation
//! - `sensitivity` - Sampler, evaluator and estimator on realistic inputs

mod fixtures;
