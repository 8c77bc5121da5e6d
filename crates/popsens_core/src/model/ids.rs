use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cohort::{BRACKET_LABELS, Sex, TRANSITIONS};
use super::rates::MAX_SURVIVAL_RATE;

/// Survival transitions varied in the standard analysis (out of 0-4, 10-14, 25-29, 35-39, 50-54)
pub const SENSITIVE_TRANSITIONS: [usize; 5] = [0, 2, 5, 7, 10];

/// An uncertain model input and the rate it overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterId {
    /// Total fertility (births per fertile adult), split by sex before projection
    Fertility,
    /// Fraction of newborns that are female
    FemaleShare,
    /// Survival multiplier out of `bracket` for one sex
    Survival { sex: Sex, bracket: usize },
}

impl ParameterId {
    /// The twelve parameters of the standard analysis, in report order
    #[must_use]
    pub fn standard() -> Vec<ParameterId> {
        let mut ids = vec![ParameterId::Fertility, ParameterId::FemaleShare];
        for sex in Sex::ALL {
            ids.extend(
                SENSITIVE_TRANSITIONS
                    .iter()
                    .map(|&bracket| ParameterId::Survival { sex, bracket }),
            );
        }
        ids
    }

    /// Range `(min, max)` of values the overridden rate may take
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        match self {
            ParameterId::Fertility => (0.0, f64::INFINITY),
            ParameterId::FemaleShare => (0.0, 1.0),
            ParameterId::Survival { .. } => (0.0, MAX_SURVIVAL_RATE),
        }
    }

    /// Canonical column name, e.g. `fertility` or `25-29_female`
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            ParameterId::Fertility => "fertility".to_string(),
            ParameterId::FemaleShare => "female_percentage".to_string(),
            ParameterId::Survival { sex, bracket } => match BRACKET_LABELS.get(*bracket) {
                Some(label) => format!("{label}_{sex}"),
                None => format!("bracket{bracket}_{sex}"),
            },
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParameter(pub String);

impl fmt::Display for UnknownParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter name '{}'", self.0)
    }
}

impl std::error::Error for UnknownParameter {}

impl FromStr for ParameterId {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fertility" => return Ok(ParameterId::Fertility),
            "female_percentage" => return Ok(ParameterId::FemaleShare),
            _ => {}
        }
        let unknown = || UnknownParameter(s.to_string());
        let (label, sex) = s.rsplit_once('_').ok_or_else(unknown)?;
        let sex = Sex::parse(sex).ok_or_else(unknown)?;
        let bracket = BRACKET_LABELS[..TRANSITIONS]
            .iter()
            .position(|l| *l == label)
            .ok_or_else(unknown)?;
        Ok(ParameterId::Survival { sex, bracket })
    }
}
