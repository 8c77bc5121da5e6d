//! Batch evaluator: one projection per sample matrix row.
//!
//! Rows are independent, so they are evaluated in parallel when the
//! `parallel` feature is enabled. Each row writes only its own output slots,
//! which keeps parallel and serial results bit-identical.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::ConfigError;
use crate::model::{CohortState, Outcomes, ParameterId, VitalRates};
use crate::projection::Projection;

use super::config::{EvaluationPlan, ParameterSpace};
use super::sampler::SampleMatrix;

/// Baseline rates with one row of sampled values applied
#[must_use]
pub fn apply_parameters(baseline: &VitalRates, space: &ParameterSpace, row: &[f64]) -> VitalRates {
    let mut rates = *baseline;
    let mut fertility = None;
    let mut female_share = None;

    for (parameter, &value) in space.parameters().iter().zip(row) {
        // point intervals are widened past the domain edge
        let (min, max) = parameter.id.domain();
        let value = value.clamp(min, max);
        match parameter.id {
            ParameterId::Fertility => fertility = Some(value),
            ParameterId::FemaleShare => female_share = Some(value),
            ParameterId::Survival { sex, bracket } => {
                if let Some(rate) = rates.survival_mut(sex).get_mut(bracket) {
                    *rate = value;
                }
            }
        }
    }

    if fertility.is_some() || female_share.is_some() {
        rates.set_fertility(
            fertility.unwrap_or_else(|| baseline.fertility()),
            female_share.unwrap_or_else(|| baseline.female_share()),
        );
    }
    rates
}

/// Checkpoint totals for one row, written into `out` (one slot per checkpoint)
fn evaluate_row(
    state: &CohortState,
    baseline: &VitalRates,
    space: &ParameterSpace,
    plan: &EvaluationPlan,
    row: &[f64],
    out: &mut [f64],
) {
    let rates = apply_parameters(baseline, space, row);
    let checkpoints = plan.checkpoints();
    Projection::new(state, &rates)
        .with_options(plan.options())
        .run(plan.periods(), |period, total| {
            for (slot, _) in out
                .iter_mut()
                .zip(checkpoints)
                .filter(|(_, c)| **c == period)
            {
                *slot = total;
            }
        });
}

/// Project every row of `matrix` from `state` and collect the totals at the
/// plan's checkpoints.
///
/// `baseline` is never modified; each row works on its own copy.
pub fn evaluate(
    state: &CohortState,
    baseline: &VitalRates,
    space: &ParameterSpace,
    matrix: &SampleMatrix,
    plan: &EvaluationPlan,
) -> Result<Outcomes, ConfigError> {
    if matrix.dims() != space.dim() {
        return Err(ConfigError::MatrixShape {
            expected: space.dim(),
            found: matrix.dims(),
        });
    }
    if let Some(&checkpoint) = plan.checkpoints().iter().find(|&&c| c >= plan.periods()) {
        return Err(ConfigError::CheckpointOutOfRange {
            checkpoint,
            periods: plan.periods(),
        });
    }

    let rows = matrix.rows();
    let width = plan.checkpoints().len();
    if width == 0 {
        return Ok(Outcomes {
            checkpoints: Vec::new(),
            series: Vec::new(),
        });
    }

    // row-major: totals[row * width + c]
    let mut totals = vec![0.0; rows * width];

    #[cfg(feature = "parallel")]
    totals
        .par_chunks_mut(width)
        .zip(matrix.values().par_chunks(space.dim()))
        .for_each(|(out, row)| evaluate_row(state, baseline, space, plan, row, out));

    #[cfg(not(feature = "parallel"))]
    totals
        .chunks_mut(width)
        .zip(matrix.values().chunks(space.dim()))
        .for_each(|(out, row)| evaluate_row(state, baseline, space, plan, row, out));

    let series = (0..width)
        .map(|c| totals.iter().skip(c).step_by(width).copied().collect())
        .collect();

    Ok(Outcomes {
        checkpoints: plan.checkpoints().to_vec(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::saltelli_sample;
    use crate::model::{AGE_BRACKETS, MAX_SURVIVAL_RATE, Sex, TRANSITIONS};
    use crate::projection::{ProjectionOptions, project};

    fn baseline() -> VitalRates {
        VitalRates {
            female_birth_rate: 0.24,
            male_birth_rate: 0.26,
            female_survival: [0.98; TRANSITIONS],
            male_survival: [0.97; TRANSITIONS],
        }
    }

    fn start() -> CohortState {
        CohortState::new(&[1_000.0; AGE_BRACKETS], &[1_000.0; AGE_BRACKETS]).unwrap()
    }

    #[test]
    fn test_apply_fertility_and_share() {
        let ids = [ParameterId::Fertility, ParameterId::FemaleShare];
        let space = ParameterSpace::new(&ids, &[(1.0, 3.0), (0.4, 0.6)]).unwrap();
        let rates = apply_parameters(&baseline(), &space, &[2.0, 0.4]);
        assert!((rates.female_birth_rate - 0.2).abs() < 1e-12);
        assert!((rates.male_birth_rate - 0.3).abs() < 1e-12);
        assert_eq!(rates.female_survival, baseline().female_survival);
    }

    #[test]
    fn test_apply_survival_touches_single_entry() {
        let id = ParameterId::Survival {
            sex: Sex::Male,
            bracket: 7,
        };
        let space = ParameterSpace::new(&[id], &[(0.5, 1.0)]).unwrap();
        let rates = apply_parameters(&baseline(), &space, &[0.6]);
        for (i, rate) in rates.male_survival.iter().enumerate() {
            let expected = if i == 7 { 0.6 } else { 0.97 };
            assert_eq!(*rate, expected);
        }
        assert_eq!(rates.female_birth_rate, 0.24);
        assert_eq!(rates.male_birth_rate, 0.26);
    }

    #[test]
    fn test_point_interval_at_domain_edge_stays_in_domain() {
        let survival = ParameterId::Survival {
            sex: Sex::Female,
            bracket: 3,
        };
        let ids = [ParameterId::FemaleShare, survival];
        let space = ParameterSpace::new(&ids, &[(1.0, 1.0), (2.0, 2.0)]).unwrap();
        let matrix = saltelli_sample(&space, 4, 4).unwrap();

        for row in matrix.iter_rows() {
            let rates = apply_parameters(&baseline(), &space, row);
            assert!(rates.female_survival[3] <= MAX_SURVIVAL_RATE);
            assert!(rates.male_birth_rate >= 0.0);
        }

        let start = start();
        let plan = EvaluationPlan::new(3, vec![2], ProjectionOptions::default()).unwrap();
        let outcomes = evaluate(&start, &baseline(), &space, &matrix, &plan).unwrap();
        assert!(outcomes.series[0].iter().all(|t| *t >= 0.0));
    }

    #[test]
    fn test_outcomes_match_direct_projection() {
        let space = ParameterSpace::new(&[ParameterId::Fertility], &[(1.5, 2.5)]).unwrap();
        let matrix = saltelli_sample(&space, 4, 4).unwrap();
        let plan = EvaluationPlan::new(10, vec![1, 9], ProjectionOptions::default()).unwrap();
        let outcomes = evaluate(&start(), &baseline(), &space, &matrix, &plan).unwrap();

        assert_eq!(outcomes.series.len(), 2);
        assert_eq!(outcomes.samples(), matrix.rows());
        for row in 0..matrix.rows() {
            let rates = apply_parameters(&baseline(), &space, matrix.row(row));
            let totals = project(&start(), &rates, 10);
            assert_eq!(outcomes.series[0][row], totals[1]);
            assert_eq!(outcomes.series[1][row], totals[9]);
        }
    }

    #[test]
    fn test_shape_errors() {
        let space = ParameterSpace::new(&[ParameterId::Fertility], &[(1.5, 2.5)]).unwrap();
        let wider = ParameterSpace::new(
            &[ParameterId::Fertility, ParameterId::FemaleShare],
            &[(1.5, 2.5), (0.4, 0.6)],
        )
        .unwrap();
        let matrix = saltelli_sample(&wider, 2, 0).unwrap();
        let plan = EvaluationPlan::default();
        assert_eq!(
            evaluate(&start(), &baseline(), &space, &matrix, &plan),
            Err(ConfigError::MatrixShape {
                expected: 1,
                found: 2
            })
        );
    }
}
