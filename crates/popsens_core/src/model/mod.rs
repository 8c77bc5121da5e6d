mod cohort;
mod ids;
mod interval;
mod rates;
mod results;

pub use cohort::{
    AGE_BRACKETS, BRACKET_LABELS, CohortState, CohortVector, FERTILE_BRACKET_COUNT,
    FERTILE_BRACKETS, PERIOD_YEARS, Sex, TRANSITIONS,
};
pub(crate) use cohort::fertile_women;
pub use ids::{ParameterId, SENSITIVE_TRANSITIONS, UnknownParameter};
pub use interval::{DEGENERATE_EPSILON, Interval};
pub use rates::{MAX_SURVIVAL_RATE, SurvivalRates, VitalRates, recover_rate};
pub use results::{
    CheckpointReport, CountryReport, OutcomeSeries, Outcomes, ParameterSensitivity,
    ScenarioReport,
};
