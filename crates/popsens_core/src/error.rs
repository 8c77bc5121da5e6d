use std::fmt;

use crate::model::{ParameterId, Sex};

/// Errors caused by malformed or inconsistent historical input
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// An age cohort vector did not have one entry per age bracket
    BracketCount {
        sex: Sex,
        expected: usize,
        found: usize,
    },
    /// A bracket held a negative or non-finite count
    InvalidCount { sex: Sex, bracket: usize, value: f64 },
    /// The fertile female population (ages 20-39) was exactly zero
    ZeroFertilePopulation,
    /// A historical series had too few years for the requested lag
    SeriesTooShort { years: usize, required: usize },
    /// Female and male series had different lengths
    SeriesLengthMismatch { female: usize, male: usize },
    /// Required sex/year rows were absent from a table
    MissingRows(String),
    /// A table row or cell of this country could not be read
    MalformedRow { line: usize, reason: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::BracketCount {
                sex,
                expected,
                found,
            } => write!(
                f,
                "{sex} cohort vector has {found} brackets, expected {expected}"
            ),
            DataError::InvalidCount {
                sex,
                bracket,
                value,
            } => write!(f, "{sex} bracket {bracket} has invalid count {value}"),
            DataError::ZeroFertilePopulation => {
                write!(f, "fertile female population is zero, birth rate undefined")
            }
            DataError::SeriesTooShort { years, required } => {
                write!(f, "series has {years} years, at least {required} required")
            }
            DataError::SeriesLengthMismatch { female, male } => write!(
                f,
                "female series has {female} years but male series has {male}"
            ),
            DataError::MissingRows(what) => write!(f, "missing rows: {what}"),
            DataError::MalformedRow { line, reason } => {
                write!(f, "malformed row at line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Errors caused by an inconsistent analysis configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A parameter space with no parameters
    EmptyParameterSpace,
    /// Number of parameters and number of declared bounds differ
    BoundsCountMismatch { parameters: usize, bounds: usize },
    /// Interval is non-finite or inverted
    DegenerateInterval {
        parameter: ParameterId,
        low: f64,
        high: f64,
    },
    /// Interval reaches outside the values its rate may take
    OutOfDomain {
        parameter: ParameterId,
        low: f64,
        high: f64,
    },
    /// No bounds were available for a parameter
    MissingBounds(ParameterId),
    /// A survival parameter names a bracket with no outgoing transition
    InvalidBracket(ParameterId),
    /// A parameter appeared twice in a space
    DuplicateParameter(ParameterId),
    /// Sample count knob was zero or not a power of two
    InvalidSampleCount(usize),
    /// The space has more parameters than the Sobol tables support
    TooManyParameters { parameters: usize, max: usize },
    /// A checkpoint lies beyond the projection horizon
    CheckpointOutOfRange { checkpoint: usize, periods: usize },
    /// Sample matrix width does not match the parameter space
    MatrixShape { expected: usize, found: usize },
    /// Outcome length is not compatible with the Saltelli layout
    OutcomeLength { len: usize, group: usize },
    /// A narrowing coefficient outside [0, 0.5)
    InvalidNarrowing(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyParameterSpace => write!(f, "parameter space is empty"),
            ConfigError::BoundsCountMismatch { parameters, bounds } => write!(
                f,
                "{parameters} parameters declared but {bounds} bounds supplied"
            ),
            ConfigError::DegenerateInterval {
                parameter,
                low,
                high,
            } => write!(f, "invalid interval [{low}, {high}] for {parameter}"),
            ConfigError::OutOfDomain {
                parameter,
                low,
                high,
            } => {
                let (min, max) = parameter.domain();
                write!(
                    f,
                    "interval [{low}, {high}] for {parameter} lies outside [{min}, {max}]"
                )
            }
            ConfigError::MissingBounds(id) => write!(f, "no bounds available for {id}"),
            ConfigError::InvalidBracket(id) => {
                write!(f, "{id} does not name a survival transition")
            }
            ConfigError::DuplicateParameter(id) => write!(f, "parameter {id} declared twice"),
            ConfigError::InvalidSampleCount(n) => {
                write!(f, "sample count {n} must be a positive power of two")
            }
            ConfigError::TooManyParameters { parameters, max } => write!(
                f,
                "{parameters} parameters exceed the supported maximum of {max}"
            ),
            ConfigError::CheckpointOutOfRange {
                checkpoint,
                periods,
            } => write!(
                f,
                "checkpoint {checkpoint} is outside a {periods}-period projection"
            ),
            ConfigError::MatrixShape { expected, found } => write!(
                f,
                "sample matrix has {found} columns, parameter space has {expected}"
            ),
            ConfigError::OutcomeLength { len, group } => write!(
                f,
                "outcome series of length {len} is not a multiple of {group}"
            ),
            ConfigError::InvalidNarrowing(coeff) => {
                write!(f, "narrowing coefficient {coeff} must lie in [0, 0.5)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Any error that aborts the analysis of one country
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    Data(DataError),
    Config(ConfigError),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Data(e) => write!(f, "data error: {e}"),
            AnalysisError::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Data(e) => Some(e),
            AnalysisError::Config(e) => Some(e),
        }
    }
}

impl From<DataError> for AnalysisError {
    fn from(err: DataError) -> Self {
        AnalysisError::Data(err)
    }
}

impl From<ConfigError> for AnalysisError {
    fn from(err: ConfigError) -> Self {
        AnalysisError::Config(err)
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
