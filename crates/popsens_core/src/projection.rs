//! Cohort-component projection engine.
//!
//! Each period the fertile female population is snapshotted, every cohort is
//! aged one bracket by its survival multiplier (oldest first, so each bracket
//! reads its predecessor's pre-update value), and bracket 0 is replaced by the
//! newborns of that period. The open `100+` bracket receives only the
//! survivors of `95-99`.
//!
//! The hot path never allocates: [`Projection`] owns a `Copy` working pyramid
//! and reports period totals through a callback.

use serde::{Deserialize, Serialize};

use crate::model::{
    AGE_BRACKETS, CohortState, CohortVector, OutcomeSeries, TRANSITIONS, VitalRates,
    fertile_women,
};

/// How the per-period total population is accounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accounting {
    /// Sum of all brackets after the update
    #[default]
    Conserved,
    /// Also counts the survivors of the open bracket a second time
    /// (`x[100+] × s[95-99]`), matching the reference baseline model's totals
    Legacy,
}

/// Whether cohort counts stay fractional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    #[default]
    Exact,
    /// Round every cohort to whole persons (ties to even)
    WholePersons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectionOptions {
    #[serde(default)]
    pub accounting: Accounting,
    #[serde(default)]
    pub rounding: Rounding,
}

impl ProjectionOptions {
    /// Options reproducing the reference baseline model
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            accounting: Accounting::Legacy,
            rounding: Rounding::WholePersons,
        }
    }

    #[inline]
    fn round(&self, value: f64) -> f64 {
        match self.rounding {
            Rounding::Exact => value,
            Rounding::WholePersons => value.round_ties_even(),
        }
    }
}

/// A running projection over a private copy of the starting pyramid
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    women: CohortVector,
    men: CohortVector,
    rates: &'a VitalRates,
    options: ProjectionOptions,
}

impl<'a> Projection<'a> {
    pub fn new(start: &CohortState, rates: &'a VitalRates) -> Self {
        Self {
            women: *start.female(),
            men: *start.male(),
            rates,
            options: ProjectionOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ProjectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Current pyramid
    #[must_use]
    pub fn state(&self) -> CohortState {
        CohortState::from_vectors(self.women, self.men)
    }

    /// Advance one period and return its total population
    pub fn step(&mut self) -> f64 {
        let rates = self.rates;
        let opts = self.options;
        let fertile = fertile_women(&self.women);

        for i in (1..AGE_BRACKETS).rev() {
            self.women[i] = opts.round(self.women[i - 1] * rates.female_survival[i - 1]);
            self.men[i] = opts.round(self.men[i - 1] * rates.male_survival[i - 1]);
        }

        self.women[0] = opts.round(fertile * rates.female_birth_rate);
        self.men[0] = opts.round(fertile * rates.male_birth_rate);

        let total = self.women.iter().sum::<f64>() + self.men.iter().sum::<f64>();
        match opts.accounting {
            Accounting::Conserved => total,
            Accounting::Legacy => {
                let last = TRANSITIONS - 1;
                total
                    + opts.round(self.women[AGE_BRACKETS - 1] * rates.female_survival[last])
                    + opts.round(self.men[AGE_BRACKETS - 1] * rates.male_survival[last])
            }
        }
    }

    /// Advance `periods` times, handing `(period, total)` to `on_period` after each
    pub fn run(&mut self, periods: usize, mut on_period: impl FnMut(usize, f64)) {
        for period in 0..periods {
            let total = self.step();
            on_period(period, total);
        }
    }
}

/// Total population after each of `periods` periods
#[must_use]
pub fn project(start: &CohortState, rates: &VitalRates, periods: usize) -> OutcomeSeries {
    project_with(start, rates, periods, ProjectionOptions::default())
}

#[must_use]
pub fn project_with(
    start: &CohortState,
    rates: &VitalRates,
    periods: usize,
    options: ProjectionOptions,
) -> OutcomeSeries {
    let mut totals = Vec::with_capacity(periods);
    Projection::new(start, rates)
        .with_options(options)
        .run(periods, |_, total| totals.push(total));
    totals
}

/// Full pyramid after each of `periods` periods
#[must_use]
pub fn trajectory(
    start: &CohortState,
    rates: &VitalRates,
    periods: usize,
    options: ProjectionOptions,
) -> Vec<CohortState> {
    let mut projection = Projection::new(start, rates).with_options(options);
    (0..periods)
        .map(|_| {
            projection.step();
            projection.state()
        })
        .collect()
}
