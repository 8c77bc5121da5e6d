use serde::{Deserialize, Serialize};

use super::cohort::CohortState;
use super::interval::Interval;

/// Total population per sample at one checkpoint period
pub type OutcomeSeries = Vec<f64>;

/// Batch evaluator output: one series per checkpoint, all of equal length.
///
/// `series[c][row]` is the total population of sample `row` at `checkpoints[c]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcomes {
    pub checkpoints: Vec<usize>,
    pub series: Vec<OutcomeSeries>,
}

impl Outcomes {
    #[must_use]
    pub fn samples(&self) -> usize {
        self.series.first().map_or(0, Vec::len)
    }

    /// The four (or however many) checkpoint totals of one sample
    pub fn row(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.series.iter().map(move |s| s[index])
    }
}

/// Sensitivity of one checkpoint outcome to one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSensitivity {
    pub parameter: String,
    /// First-order index
    pub s1: f64,
    /// Bootstrap 95% half-width for `s1`
    pub s1_conf: f64,
    /// Total-order index
    pub st: f64,
    pub st_conf: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointReport {
    /// Zero-based projection period
    pub period: usize,
    /// Years elapsed at the end of that period
    pub years: u32,
    pub indices: Vec<ParameterSensitivity>,
}

impl CheckpointReport {
    /// Years elapsed once period `period` (zero-based) has been projected
    #[must_use]
    pub fn years_for(period: usize, period_years: u32) -> u32 {
        (period as u32 + 1) * period_years
    }

    #[must_use]
    pub fn s1_sum(&self) -> f64 {
        self.indices.iter().map(|p| p.s1).sum()
    }

    #[must_use]
    pub fn get(&self, parameter: &str) -> Option<&ParameterSensitivity> {
        self.indices.iter().find(|p| p.parameter == parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    /// Fertility interval used by this scenario, when fertility was varied
    pub fertility_bounds: Option<Interval>,
    pub samples: usize,
    pub checkpoints: Vec<CheckpointReport>,
}

/// Everything produced for one country; built independently of other countries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryReport {
    pub country: String,
    pub scenarios: Vec<ScenarioReport>,
    /// Baseline projection, one pyramid per period, when requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trajectory: Vec<CohortState>,
}

impl CountryReport {
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.scenario == name)
    }
}
