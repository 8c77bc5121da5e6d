//! End-to-end tests for the command-line pipeline
//!
//! Tests are organized by topic:
//! - `pipeline` - Loading tables, running countries and writing reports
