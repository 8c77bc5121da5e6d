//! Baseline rate derivation from two consecutive census pyramids.

use crate::error::DataError;
use crate::model::{
    CohortState, CohortVector, Sex, SurvivalRates, TRANSITIONS, VitalRates, recover_rate,
};

/// Derive baseline survival and birth rates from `previous` and `current`,
/// which must be exactly one projection period apart.
///
/// A zero denominator in `previous` is treated as 1, so an empty bracket yields
/// a rate near zero instead of an error. Every survival ratio then passes
/// through [`recover_rate`].
pub fn derive_baseline_rates(
    previous: &CohortState,
    current: &CohortState,
) -> Result<VitalRates, DataError> {
    let fertile = current.fertile_women();
    if fertile == 0.0 {
        return Err(DataError::ZeroFertilePopulation);
    }

    Ok(VitalRates {
        female_birth_rate: current.female()[0] / fertile,
        male_birth_rate: current.male()[0] / fertile,
        female_survival: survival_rates(previous.get(Sex::Female), current.get(Sex::Female)),
        male_survival: survival_rates(previous.get(Sex::Male), current.get(Sex::Male)),
    })
}

/// Survival multipliers carrying `previous[i]` into `current[i + 1]`
#[must_use]
pub fn survival_rates(previous: &CohortVector, current: &CohortVector) -> SurvivalRates {
    let mut rates = [0.0; TRANSITIONS];
    for (i, rate) in rates.iter_mut().enumerate() {
        let denominator = if previous[i] == 0.0 { 1.0 } else { previous[i] };
        *rate = recover_rate(current[i + 1] / denominator);
    }
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AGE_BRACKETS, MAX_SURVIVAL_RATE};

    fn state(female: [f64; AGE_BRACKETS], male: [f64; AGE_BRACKETS]) -> CohortState {
        CohortState::new(&female, &male).unwrap()
    }

    #[test]
    fn test_survival_is_ratio_of_next_bracket() {
        let previous = state([100.0; AGE_BRACKETS], [200.0; AGE_BRACKETS]);
        let current = state([90.0; AGE_BRACKETS], [150.0; AGE_BRACKETS]);
        let rates = derive_baseline_rates(&previous, &current).unwrap();
        assert!(rates.female_survival.iter().all(|r| (*r - 0.9).abs() < 1e-12));
        assert!(rates.male_survival.iter().all(|r| (*r - 0.75).abs() < 1e-12));
    }

    #[test]
    fn test_survival_clamped_to_two() {
        let mut later = [10.0; AGE_BRACKETS];
        later[6] = 35.0; // 3.5x bracket 5 of the earlier pyramid
        let previous = state([10.0; AGE_BRACKETS], [10.0; AGE_BRACKETS]);
        let current = state(later, [10.0; AGE_BRACKETS]);
        let rates = derive_baseline_rates(&previous, &current).unwrap();
        assert_eq!(rates.female_survival[5], MAX_SURVIVAL_RATE);
        assert!(
            rates
                .female_survival
                .iter()
                .chain(rates.male_survival.iter())
                .all(|r| (0.0..=MAX_SURVIVAL_RATE).contains(r))
        );
    }

    #[test]
    fn test_zero_denominator_treated_as_one() {
        let mut earlier = [10.0; AGE_BRACKETS];
        earlier[19] = 0.0;
        let mut later = [10.0; AGE_BRACKETS];
        later[20] = 1.5;
        let rates = derive_baseline_rates(
            &state(earlier, [10.0; AGE_BRACKETS]),
            &state(later, [10.0; AGE_BRACKETS]),
        )
        .unwrap();
        assert_eq!(rates.female_survival[19], 1.5);

        later[20] = 0.0;
        let rates = derive_baseline_rates(
            &state(earlier, [10.0; AGE_BRACKETS]),
            &state(later, [10.0; AGE_BRACKETS]),
        )
        .unwrap();
        assert_eq!(rates.female_survival[19], 0.0);
    }

    #[test]
    fn test_birth_rates_use_fertile_women() {
        let mut female = [0.0; AGE_BRACKETS];
        let mut male = [0.0; AGE_BRACKETS];
        female[0] = 30.0;
        male[0] = 32.0;
        for bracket in 4..=7 {
            female[bracket] = 25.0;
        }
        let current = state(female, male);
        let rates = derive_baseline_rates(&current, &current).unwrap();
        assert_eq!(rates.female_birth_rate, 0.3);
        assert_eq!(rates.male_birth_rate, 0.32);
    }

    #[test]
    fn test_zero_fertile_population_is_error() {
        let mut female = [5.0; AGE_BRACKETS];
        for bracket in 4..=7 {
            female[bracket] = 0.0;
        }
        let current = state(female, [5.0; AGE_BRACKETS]);
        assert_eq!(
            derive_baseline_rates(&current, &current),
            Err(DataError::ZeroFertilePopulation)
        );
    }
}
