//! Bounds providers: where the `[low, high]` range of each parameter comes from.
//!
//! The analysis only needs one raw range per parameter. Ranges are either
//! supplied precomputed ([`FixedBounds`]) or derived from the spread of
//! historical rates ([`HistoricalBounds`]).

use rustc_hash::FxHashMap;

use crate::error::DataError;
use crate::model::{
    CohortState, FERTILE_BRACKET_COUNT, ParameterId, Sex, TRANSITIONS, recover_rate,
};

/// Source of raw `(low, high)` ranges per parameter
pub trait BoundsProvider {
    fn bounds(&self, id: ParameterId) -> Option<(f64, f64)>;
}

/// Precomputed ranges, e.g. read from a ranges table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedBounds {
    ranges: FxHashMap<ParameterId, (f64, f64)>,
}

impl FixedBounds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ParameterId, low: f64, high: f64) {
        self.ranges.insert(id, (low, high));
    }

    #[must_use]
    pub fn with(mut self, id: ParameterId, low: f64, high: f64) -> Self {
        self.insert(id, low, high);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl BoundsProvider for FixedBounds {
    fn bounds(&self, id: ParameterId) -> Option<(f64, f64)> {
        self.ranges.get(&id).copied()
    }
}

/// Running min/max over the finite values seen
#[derive(Debug, Clone, Copy)]
struct Extent {
    low: f64,
    high: f64,
}

impl Extent {
    const EMPTY: Extent = Extent {
        low: f64::INFINITY,
        high: f64::NEG_INFINITY,
    };

    fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.low = self.low.min(value);
            self.high = self.high.max(value);
        }
    }

    fn range(self) -> Option<(f64, f64)> {
        (self.low <= self.high).then_some((self.low, self.high))
    }
}

/// Ranges spanned by historical rates of one country.
///
/// Built from an annual series of pyramids. Survival ratios compare each year
/// with the year `lag` years later (one projection period for 5-year brackets).
#[derive(Debug, Clone)]
pub struct HistoricalBounds {
    fertility: Extent,
    female_share: Extent,
    female_survival: [Extent; TRANSITIONS],
    male_survival: [Extent; TRANSITIONS],
}

impl HistoricalBounds {
    pub fn from_series(series: &[CohortState], lag: usize) -> Result<Self, DataError> {
        let required = lag.max(1) + 1;
        if series.len() < required {
            return Err(DataError::SeriesTooShort {
                years: series.len(),
                required,
            });
        }

        let mut bounds = Self {
            fertility: Extent::EMPTY,
            female_share: Extent::EMPTY,
            female_survival: [Extent::EMPTY; TRANSITIONS],
            male_survival: [Extent::EMPTY; TRANSITIONS],
        };

        for year in series {
            let female_births = year.female()[0];
            let births = female_births + year.male()[0];
            bounds
                .fertility
                .push(births / year.fertile_women() * FERTILE_BRACKET_COUNT);
            bounds.female_share.push(female_births / births);
        }

        for (earlier, later) in series.iter().zip(&series[lag.max(1)..]) {
            for sex in Sex::ALL {
                let extents = match sex {
                    Sex::Female => &mut bounds.female_survival,
                    Sex::Male => &mut bounds.male_survival,
                };
                let (before, after) = (earlier.get(sex), later.get(sex));
                for (i, extent) in extents.iter_mut().enumerate() {
                    extent.push(recover_rate(after[i + 1] / before[i]));
                }
            }
        }

        Ok(bounds)
    }
}

impl BoundsProvider for HistoricalBounds {
    fn bounds(&self, id: ParameterId) -> Option<(f64, f64)> {
        match id {
            ParameterId::Fertility => self.fertility.range(),
            ParameterId::FemaleShare => self.female_share.range(),
            ParameterId::Survival {
                sex: Sex::Female,
                bracket,
            } => self.female_survival.get(bracket)?.range(),
            ParameterId::Survival {
                sex: Sex::Male,
                bracket,
            } => self.male_survival.get(bracket)?.range(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AGE_BRACKETS;

    fn year(scale: f64, newborns: (f64, f64)) -> CohortState {
        let mut female = [100.0 * scale; AGE_BRACKETS];
        let mut male = [100.0 * scale; AGE_BRACKETS];
        female[0] = newborns.0;
        male[0] = newborns.1;
        CohortState::new(&female, &male).unwrap()
    }

    #[test]
    fn test_fixed_bounds_lookup() {
        let bounds = FixedBounds::new().with(ParameterId::Fertility, 1.5, 2.5);
        assert_eq!(bounds.bounds(ParameterId::Fertility), Some((1.5, 2.5)));
        assert_eq!(bounds.bounds(ParameterId::FemaleShare), None);
    }

    #[test]
    fn test_fertility_and_share_ranges() {
        let series = vec![year(1.0, (80.0, 120.0)), year(1.0, (100.0, 100.0))];
        let bounds = HistoricalBounds::from_series(&series, 1).unwrap();
        // births over 400 fertile women, times four brackets
        assert_eq!(bounds.bounds(ParameterId::Fertility), Some((2.0, 2.0)));
        assert_eq!(bounds.bounds(ParameterId::FemaleShare), Some((0.4, 0.5)));
    }

    #[test]
    fn test_survival_ranges_use_lag() {
        let series = vec![
            year(1.0, (1.0, 1.0)),
            year(0.9, (1.0, 1.0)),
            year(0.8, (1.0, 1.0)),
            year(0.6, (1.0, 1.0)),
        ];
        let bounds = HistoricalBounds::from_series(&series, 2).unwrap();
        let id = ParameterId::Survival {
            sex: Sex::Male,
            bracket: 5,
        };
        let (low, high) = bounds.bounds(id).unwrap();
        assert!((low - 0.6 / 0.9).abs() < 1e-12);
        assert!((high - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_series_too_short() {
        let series = vec![year(1.0, (1.0, 1.0)); 3];
        assert!(matches!(
            HistoricalBounds::from_series(&series, 5),
            Err(DataError::SeriesTooShort {
                years: 3,
                required: 6
            })
        ));
    }
}
