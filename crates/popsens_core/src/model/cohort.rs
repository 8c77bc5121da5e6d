use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Number of five-year age brackets, `0-4` through the open `100+` bracket
pub const AGE_BRACKETS: usize = 21;

/// Number of bracket-to-bracket transitions
pub const TRANSITIONS: usize = AGE_BRACKETS - 1;

/// Brackets holding the fertile female population (ages 20-39)
pub const FERTILE_BRACKETS: std::ops::RangeInclusive<usize> = 4..=7;

/// Number of fertile brackets, used to average total fertility per bracket
pub const FERTILE_BRACKET_COUNT: f64 = 4.0;

/// Years covered by one projection period
pub const PERIOD_YEARS: u32 = 5;

pub const BRACKET_LABELS: [&str; AGE_BRACKETS] = [
    "0-4", "5-9", "10-14", "15-19", "20-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50-54",
    "55-59", "60-64", "65-69", "70-74", "75-79", "80-84", "85-89", "90-94", "95-99", "100+",
];

/// Population counts per age bracket, youngest first
pub type CohortVector = [f64; AGE_BRACKETS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }

    /// Parse the capitalized or lowercase sex label used in population tables
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Some(Sex::Female),
            "male" | "m" => Some(Sex::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Female and male age pyramids at one point in time.
///
/// Both vectors always hold [`AGE_BRACKETS`] finite, non-negative counts.
/// The type is `Copy` so projection runs can work on private stack copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortState {
    female: CohortVector,
    male: CohortVector,
}

impl CohortState {
    /// Build a state from untrusted slices, validating bracket count and values
    pub fn new(female: &[f64], male: &[f64]) -> Result<Self, DataError> {
        Ok(Self {
            female: to_cohort_vector(Sex::Female, female)?,
            male: to_cohort_vector(Sex::Male, male)?,
        })
    }

    /// Build a state from vectors already known to be valid (e.g. projection output)
    pub(crate) fn from_vectors(female: CohortVector, male: CohortVector) -> Self {
        Self { female, male }
    }

    #[must_use]
    pub fn female(&self) -> &CohortVector {
        &self.female
    }

    #[must_use]
    pub fn male(&self) -> &CohortVector {
        &self.male
    }

    #[must_use]
    pub fn get(&self, sex: Sex) -> &CohortVector {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }

    /// Female population in the fertile brackets
    #[must_use]
    pub fn fertile_women(&self) -> f64 {
        fertile_women(&self.female)
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.female.iter().sum::<f64>() + self.male.iter().sum::<f64>()
    }
}

pub(crate) fn fertile_women(female: &CohortVector) -> f64 {
    female[FERTILE_BRACKETS].iter().sum()
}

fn to_cohort_vector(sex: Sex, values: &[f64]) -> Result<CohortVector, DataError> {
    let vector: CohortVector = values.try_into().map_err(|_| DataError::BracketCount {
        sex,
        expected: AGE_BRACKETS,
        found: values.len(),
    })?;
    if let Some((bracket, &value)) = vector
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(DataError::InvalidCount {
            sex,
            bracket,
            value,
        });
    }
    Ok(vector)
}
