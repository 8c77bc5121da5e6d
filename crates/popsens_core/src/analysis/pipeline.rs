//! Per-country pipeline: derive, sample, evaluate, analyze.
//!
//! Every call returns a self-contained [`CountryReport`]; nothing is shared
//! between countries, so a caller may run them in any order.

use crate::bounds::BoundsProvider;
use crate::error::Result;
use crate::model::{
    CheckpointReport, CohortState, CountryReport, ParameterId, ParameterSensitivity,
    ScenarioReport, VitalRates,
};
use crate::projection;
use crate::rates::derive_baseline_rates;

use super::config::{ParameterSpace, SensitivityConfig};
use super::estimator::analyze;
use super::evaluator::evaluate;
use super::sampler::saltelli_sample;

pub const BASELINE_SCENARIO: &str = "baseline";
pub const NARROWED_FERTILITY_SCENARIO: &str = "narrowed_fertility";

/// Inputs for one country: its two most recent pyramids, one period apart,
/// and where parameter ranges come from
#[derive(Clone, Copy)]
pub struct CountryInput<'a> {
    pub country: &'a str,
    pub previous: &'a CohortState,
    pub current: &'a CohortState,
    pub bounds: &'a dyn BoundsProvider,
}

/// Run one scenario over `space`
pub fn run_scenario(
    name: &str,
    state: &CohortState,
    baseline: &VitalRates,
    space: &ParameterSpace,
    config: &SensitivityConfig,
) -> Result<ScenarioReport> {
    let plan = config.plan()?;
    let matrix = saltelli_sample(space, config.base_samples(), config.skip())?;
    tracing::debug!(
        scenario = name,
        rows = matrix.rows(),
        periods = plan.periods(),
        "evaluating samples"
    );

    let outcomes = evaluate(state, baseline, space, &matrix, &plan)?;
    let options = config.analysis_options();

    let mut checkpoints = Vec::with_capacity(outcomes.checkpoints.len());
    for (&period, series) in outcomes.checkpoints.iter().zip(&outcomes.series) {
        let indices = analyze(space, series, &options)?;
        let report = CheckpointReport {
            period,
            years: CheckpointReport::years_for(period, config.period_years),
            indices: indices
                .names
                .into_iter()
                .enumerate()
                .map(|(j, parameter)| ParameterSensitivity {
                    parameter,
                    s1: indices.s1[j],
                    s1_conf: indices.s1_conf[j],
                    st: indices.st[j],
                    st_conf: indices.st_conf[j],
                })
                .collect(),
        };
        tracing::debug!(
            scenario = name,
            years = report.years,
            s1_sum = report.s1_sum(),
            "checkpoint analysed"
        );
        checkpoints.push(report);
    }

    Ok(ScenarioReport {
        scenario: name.to_string(),
        fertility_bounds: space.get(ParameterId::Fertility).map(|p| p.bounds),
        samples: matrix.rows(),
        checkpoints,
    })
}

/// Full analysis of one country: the `baseline` scenario over the standard
/// parameter space and the `narrowed_fertility` scenario with the fertility
/// range pulled in by `config.fertility_narrowing` on each side.
pub fn analyze_country(
    input: CountryInput<'_>,
    config: &SensitivityConfig,
) -> Result<CountryReport> {
    tracing::info!(country = input.country, "analysing country");

    let baseline = derive_baseline_rates(input.previous, input.current)?;
    let space = ParameterSpace::standard(input.bounds)?;
    let narrowed = space.narrowed(ParameterId::Fertility, config.fertility_narrowing)?;

    let scenarios = [(BASELINE_SCENARIO, &space), (NARROWED_FERTILITY_SCENARIO, &narrowed)]
        .into_iter()
        .map(|(name, space)| run_scenario(name, input.current, &baseline, space, config))
        .collect::<Result<Vec<_>>>()?;

    let trajectory = if config.record_trajectory {
        projection::trajectory(input.current, &baseline, config.periods, config.projection)
    } else {
        Vec::new()
    };

    tracing::info!(
        country = input.country,
        scenarios = scenarios.len(),
        "country complete"
    );

    Ok(CountryReport {
        country: input.country.to_string(),
        scenarios,
        trajectory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::FixedBounds;
    use crate::error::{AnalysisError, ConfigError, DataError};
    use crate::model::AGE_BRACKETS;

    fn pyramid(scale: f64) -> CohortState {
        let female: Vec<f64> = (0..AGE_BRACKETS)
            .map(|i| scale * (1_000.0 - 40.0 * i as f64))
            .collect();
        let male: Vec<f64> = female.iter().map(|v| v * 0.97).collect();
        CohortState::new(&female, &male).unwrap()
    }

    fn bounds() -> FixedBounds {
        let mut bounds = FixedBounds::new()
            .with(ParameterId::Fertility, 1.6, 2.4)
            .with(ParameterId::FemaleShare, 0.47, 0.5);
        for id in ParameterId::standard().into_iter().skip(2) {
            bounds.insert(id, 0.9, 1.0);
        }
        bounds
    }

    fn small_config() -> SensitivityConfig {
        SensitivityConfig {
            sample_exponent: 5,
            bootstrap_resamples: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_scenarios_four_checkpoints() {
        let (previous, current, bounds) = (pyramid(1.0), pyramid(1.02), bounds());
        let input = CountryInput {
            country: "Testland",
            previous: &previous,
            current: &current,
            bounds: &bounds,
        };
        let report = analyze_country(input, &small_config()).unwrap();

        assert_eq!(report.country, "Testland");
        assert_eq!(report.scenarios.len(), 2);
        assert!(report.trajectory.is_empty());

        let baseline = report.scenario(BASELINE_SCENARIO).unwrap();
        assert_eq!(baseline.samples, 32 * 26);
        let years: Vec<u32> = baseline.checkpoints.iter().map(|c| c.years).collect();
        assert_eq!(years, [10, 20, 50, 100]);
        assert_eq!(baseline.checkpoints[0].indices.len(), 12);

        let narrowed = report.scenario(NARROWED_FERTILITY_SCENARIO).unwrap();
        let interval = narrowed.fertility_bounds.unwrap();
        assert!((interval.low - 1.8).abs() < 1e-12);
        assert!((interval.high - 2.2).abs() < 1e-12);
    }

    #[test]
    fn test_trajectory_recorded_on_request() {
        let (previous, current, bounds) = (pyramid(1.0), pyramid(1.02), bounds());
        let input = CountryInput {
            country: "Testland",
            previous: &previous,
            current: &current,
            bounds: &bounds,
        };
        let config = SensitivityConfig {
            record_trajectory: true,
            ..small_config()
        };
        let report = analyze_country(input, &config).unwrap();
        assert_eq!(report.trajectory.len(), config.periods);
    }

    #[test]
    fn test_missing_bounds_fails_country() {
        let (previous, current) = (pyramid(1.0), pyramid(1.02));
        let partial = FixedBounds::new().with(ParameterId::Fertility, 1.6, 2.4);
        let input = CountryInput {
            country: "Testland",
            previous: &previous,
            current: &current,
            bounds: &partial,
        };
        assert_eq!(
            analyze_country(input, &small_config()),
            Err(AnalysisError::Config(ConfigError::MissingBounds(
                ParameterId::FemaleShare
            )))
        );
    }

    #[test]
    fn test_zero_fertile_population_fails_country() {
        let mut female = [10.0; AGE_BRACKETS];
        for bracket in 4..=7 {
            female[bracket] = 0.0;
        }
        let current = CohortState::new(&female, &[10.0; AGE_BRACKETS]).unwrap();
        let bounds = bounds();
        let input = CountryInput {
            country: "Emptyland",
            previous: &current,
            current: &current,
            bounds: &bounds,
        };
        assert_eq!(
            analyze_country(input, &small_config()),
            Err(AnalysisError::Data(DataError::ZeroFertilePopulation))
        );
    }
}
