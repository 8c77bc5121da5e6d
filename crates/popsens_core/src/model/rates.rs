use serde::{Deserialize, Serialize};

use super::cohort::{FERTILE_BRACKET_COUNT, Sex, TRANSITIONS};

/// Upper clamp for any survival multiplier
pub const MAX_SURVIVAL_RATE: f64 = 2.0;

/// Per-transition survival multipliers, entry `i` carries bracket `i` into `i + 1`
pub type SurvivalRates = [f64; TRANSITIONS];

/// Birth and survival rates driving one projection.
///
/// Birth rates are per fertile woman per period, split by the sex of the newborn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalRates {
    pub female_birth_rate: f64,
    pub male_birth_rate: f64,
    pub female_survival: SurvivalRates,
    pub male_survival: SurvivalRates,
}

impl VitalRates {
    #[must_use]
    pub fn survival(&self, sex: Sex) -> &SurvivalRates {
        match sex {
            Sex::Female => &self.female_survival,
            Sex::Male => &self.male_survival,
        }
    }

    pub fn survival_mut(&mut self, sex: Sex) -> &mut SurvivalRates {
        match sex {
            Sex::Female => &mut self.female_survival,
            Sex::Male => &mut self.male_survival,
        }
    }

    /// Total fertility expressed over the fertile brackets (births per fertile adult)
    #[must_use]
    pub fn fertility(&self) -> f64 {
        (self.female_birth_rate + self.male_birth_rate) * FERTILE_BRACKET_COUNT
    }

    /// Share of newborns that are female; 0.5 when there are no births at all
    #[must_use]
    pub fn female_share(&self) -> f64 {
        let births = self.female_birth_rate + self.male_birth_rate;
        if births > 0.0 {
            self.female_birth_rate / births
        } else {
            0.5
        }
    }

    /// Replace both birth rates from a total fertility and a female share
    pub fn set_fertility(&mut self, fertility: f64, female_share: f64) {
        let per_bracket = fertility / FERTILE_BRACKET_COUNT;
        self.female_birth_rate = per_bracket * female_share;
        self.male_birth_rate = per_bracket * (1.0 - female_share);
    }
}

/// Named recovery step for survival ratios.
///
/// Infinite or undefined ratios become 0.0 (no survivors assumed) and finite
/// ratios are clamped into `[0, MAX_SURVIVAL_RATE]`. This never fails.
#[must_use]
pub fn recover_rate(ratio: f64) -> f64 {
    if !ratio.is_finite() {
        tracing::trace!(ratio, "undefined survival ratio replaced with 0");
        return 0.0;
    }
    if !(0.0..=MAX_SURVIVAL_RATE).contains(&ratio) {
        tracing::trace!(ratio, "survival ratio clamped");
    }
    ratio.clamp(0.0, MAX_SURVIVAL_RATE)
}
