//! Batch runner across countries.
//!
//! Countries are processed one after another. A data or configuration error
//! aborts only the country it concerns; it is logged and recorded as a
//! [`CountryFailure`] and the run continues.

use popsens_core::model::{CountryReport, ParameterId};
use popsens_core::{
    AnalysisError, BoundsProvider, CountryInput, DataError, FixedBounds, HistoricalBounds,
    SensitivityConfig, analyze_country,
};
use serde::{Deserialize, Serialize};

use crate::config::{RangeSource, RunConfig};
use crate::data::{PopulationTable, RangesTable, StorageError};

/// Loaded source of parameter ranges
#[derive(Debug, Clone)]
pub enum Ranges {
    Table(RangesTable),
    History { table: PopulationTable, lag: usize },
}

impl Ranges {
    pub fn load(source: &RangeSource) -> Result<Self, StorageError> {
        match source {
            RangeSource::Table(path) => Ok(Ranges::Table(RangesTable::from_path(path)?)),
            RangeSource::History { path, lag } => Ok(Ranges::History {
                table: PopulationTable::from_path(path)?,
                lag: *lag,
            }),
        }
    }

    /// Ranges for one country
    pub fn bounds_for(&self, country: &str) -> Result<CountryBounds<'_>, DataError> {
        match self {
            Ranges::Table(table) => table.get(country).map(CountryBounds::Fixed),
            Ranges::History { table, lag } => {
                let series = table.series(country)?;
                Ok(CountryBounds::Historical(HistoricalBounds::from_series(
                    &series, *lag,
                )?))
            }
        }
    }
}

/// Bounds of one country, borrowed from a table or derived from history
#[derive(Debug, Clone)]
pub enum CountryBounds<'a> {
    Fixed(&'a FixedBounds),
    Historical(HistoricalBounds),
}

impl BoundsProvider for CountryBounds<'_> {
    fn bounds(&self, id: ParameterId) -> Option<(f64, f64)> {
        match self {
            CountryBounds::Fixed(bounds) => bounds.bounds(id),
            CountryBounds::Historical(bounds) => bounds.bounds(id),
        }
    }
}

/// Report of one successfully analysed country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryResult {
    /// Census year of the most recent pyramid; projections start here
    pub base_year: i32,
    #[serde(flatten)]
    pub report: CountryReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFailure {
    pub country: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub results: Vec<CountryResult>,
    pub failures: Vec<CountryFailure>,
}

fn analyze_one(
    country: &str,
    population: &PopulationTable,
    ranges: &Ranges,
    config: &SensitivityConfig,
) -> Result<CountryResult, AnalysisError> {
    let pyramids = population.latest_pair(country)?;
    let bounds = ranges.bounds_for(country)?;
    let report = analyze_country(
        CountryInput {
            country,
            previous: &pyramids.previous,
            current: &pyramids.current,
            bounds: &bounds,
        },
        config,
    )?;
    Ok(CountryResult {
        base_year: pyramids.year,
        report,
    })
}

/// Analyse every selected country in `population`
pub fn run(population: &PopulationTable, ranges: &Ranges, config: &RunConfig) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    for requested in &config.countries {
        if !population.contains(requested) {
            let error = DataError::MissingRows(format!("no population rows for {requested}"));
            tracing::error!(country = %requested, error = %error, "country skipped");
            outcome.failures.push(CountryFailure {
                country: requested.clone(),
                error: error.to_string(),
            });
        }
    }

    let selected: Vec<&str> = population
        .countries()
        .filter(|c| config.includes(c))
        .collect();
    let total = selected.len();

    for (index, country) in selected.into_iter().enumerate() {
        tracing::info!(country, progress = format!("{}/{}", index + 1, total), "starting");
        match analyze_one(country, population, ranges, &config.sensitivity) {
            Ok(result) => outcome.results.push(result),
            Err(error) => {
                tracing::error!(country, error = %error, "country failed");
                outcome.failures.push(CountryFailure {
                    country: country.to_string(),
                    error: error.to_string(),
                });
            }
        }
    }

    tracing::info!(
        succeeded = outcome.results.len(),
        failed = outcome.failures.len(),
        "run complete"
    );
    outcome
}
