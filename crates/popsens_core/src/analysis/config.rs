//! Configuration types for variance-based sensitivity analysis.

use serde::{Deserialize, Serialize};

use crate::bounds::BoundsProvider;
use crate::error::ConfigError;
use crate::model::{Interval, PERIOD_YEARS, ParameterId, TRANSITIONS};
use crate::projection::ProjectionOptions;

use super::estimator::AnalysisOptions;

/// An uncertain parameter and its sampling range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParameterId,
    pub bounds: Interval,
}

/// Ordered set of uncertain parameters.
///
/// Column `j` of every sample matrix row holds the value of `parameters()[j]`;
/// the batch evaluator resolves each column through its [`ParameterId`] rather
/// than through a positional offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    parameters: Vec<Parameter>,
}

impl ParameterSpace {
    /// Pair each id with its raw `(low, high)` bounds
    pub fn new(ids: &[ParameterId], bounds: &[(f64, f64)]) -> Result<Self, ConfigError> {
        if ids.is_empty() {
            return Err(ConfigError::EmptyParameterSpace);
        }
        if ids.len() != bounds.len() {
            return Err(ConfigError::BoundsCountMismatch {
                parameters: ids.len(),
                bounds: bounds.len(),
            });
        }

        let mut parameters: Vec<Parameter> = Vec::with_capacity(ids.len());
        for (&id, &(low, high)) in ids.iter().zip(bounds) {
            if let ParameterId::Survival { bracket, .. } = id
                && bracket >= TRANSITIONS
            {
                return Err(ConfigError::InvalidBracket(id));
            }
            if parameters.iter().any(|p| p.id == id) {
                return Err(ConfigError::DuplicateParameter(id));
            }
            let interval = Interval::new(id, low, high)?;
            let (min, max) = id.domain();
            if low < min || high > max {
                return Err(ConfigError::OutOfDomain {
                    parameter: id,
                    low,
                    high,
                });
            }
            parameters.push(Parameter {
                id,
                bounds: interval,
            });
        }
        Ok(Self { parameters })
    }

    /// Look every id up in `provider`
    pub fn from_provider(
        ids: &[ParameterId],
        provider: &(impl BoundsProvider + ?Sized),
    ) -> Result<Self, ConfigError> {
        let bounds = ids
            .iter()
            .map(|&id| provider.bounds(id).ok_or(ConfigError::MissingBounds(id)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ids, &bounds)
    }

    /// The twelve-parameter space of the standard analysis
    pub fn standard(provider: &(impl BoundsProvider + ?Sized)) -> Result<Self, ConfigError> {
        Self::from_provider(&ParameterId::standard(), provider)
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of parameters (D)
    #[must_use]
    pub fn dim(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn get(&self, id: ParameterId) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.id.name()).collect()
    }

    /// Copy with the interval of `id` narrowed toward its midpoint by `coeff`
    /// of its width on each side
    pub fn narrowed(&self, id: ParameterId, coeff: f64) -> Result<Self, ConfigError> {
        if !(0.0..0.5).contains(&coeff) {
            return Err(ConfigError::InvalidNarrowing(coeff));
        }
        let mut space = self.clone();
        if let Some(p) = space.parameters.iter_mut().find(|p| p.id == id) {
            p.bounds = p.bounds.narrowed(coeff);
        }
        Ok(space)
    }
}

fn default_sample_exponent() -> u32 {
    11
}

fn default_periods() -> usize {
    20
}

fn default_checkpoints() -> Vec<usize> {
    vec![1, 3, 9, 19]
}

fn default_period_years() -> u32 {
    PERIOD_YEARS
}

fn default_fertility_narrowing() -> f64 {
    0.25
}

fn default_bootstrap_resamples() -> usize {
    100
}

/// Knobs of one sensitivity run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Base sample count is `2^sample_exponent`
    #[serde(default = "default_sample_exponent")]
    pub sample_exponent: u32,
    /// Leading Sobol points to discard; defaults to the base sample count
    #[serde(default)]
    pub skip: Option<usize>,
    /// Projection horizon in periods
    #[serde(default = "default_periods")]
    pub periods: usize,
    /// Zero-based periods whose totals are analysed
    #[serde(default = "default_checkpoints")]
    pub checkpoints: Vec<usize>,
    #[serde(default = "default_period_years")]
    pub period_years: u32,
    /// Narrowing applied to fertility bounds in the second scenario
    #[serde(default = "default_fertility_narrowing")]
    pub fertility_narrowing: f64,
    #[serde(default = "default_bootstrap_resamples")]
    pub bootstrap_resamples: usize,
    /// Seed for bootstrap resampling
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub projection: ProjectionOptions,
    /// Keep the baseline pyramid of every period in the report
    #[serde(default)]
    pub record_trajectory: bool,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            sample_exponent: default_sample_exponent(),
            skip: None,
            periods: default_periods(),
            checkpoints: default_checkpoints(),
            period_years: default_period_years(),
            fertility_narrowing: default_fertility_narrowing(),
            bootstrap_resamples: default_bootstrap_resamples(),
            seed: 0,
            projection: ProjectionOptions::default(),
            record_trajectory: false,
        }
    }
}

impl SensitivityConfig {
    /// Bootstrap settings for the estimator
    #[must_use]
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            resamples: self.bootstrap_resamples,
            seed: self.seed,
        }
    }

    /// Base sample count N, or 0 when the exponent overflows
    #[must_use]
    pub fn base_samples(&self) -> usize {
        1usize.checked_shl(self.sample_exponent).unwrap_or(0)
    }

    #[must_use]
    pub fn skip(&self) -> usize {
        self.skip.unwrap_or_else(|| self.base_samples())
    }

    /// Horizon and checkpoints for the batch evaluator
    pub fn plan(&self) -> Result<EvaluationPlan, ConfigError> {
        EvaluationPlan::new(self.periods, self.checkpoints.clone(), self.projection)
    }
}

/// How long to project and which period totals to record
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationPlan {
    periods: usize,
    checkpoints: Vec<usize>,
    options: ProjectionOptions,
}

impl EvaluationPlan {
    pub fn new(
        periods: usize,
        checkpoints: Vec<usize>,
        options: ProjectionOptions,
    ) -> Result<Self, ConfigError> {
        if let Some(&checkpoint) = checkpoints.iter().find(|&&c| c >= periods) {
            return Err(ConfigError::CheckpointOutOfRange {
                checkpoint,
                periods,
            });
        }
        Ok(Self {
            periods,
            checkpoints,
            options,
        })
    }

    #[must_use]
    pub fn periods(&self) -> usize {
        self.periods
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[usize] {
        &self.checkpoints
    }

    #[must_use]
    pub fn options(&self) -> ProjectionOptions {
        self.options
    }
}

impl Default for EvaluationPlan {
    fn default() -> Self {
        Self {
            periods: default_periods(),
            checkpoints: default_checkpoints(),
            options: ProjectionOptions::default(),
        }
    }
}
