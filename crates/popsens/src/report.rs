//! Output files of a run.
//!
//! - `report.json`: the full [`RunReport`]
//! - `sensitivity.csv`: one row per country, scenario, checkpoint and parameter
//! - `trajectory.csv`: baseline pyramids per projected year, only when recorded

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use popsens_core::SensitivityConfig;
use popsens_core::model::{BRACKET_LABELS, Sex};
use serde::Serialize;

use crate::data::StorageError;
use crate::runner::{CountryFailure, CountryResult, RunOutcome};
use crate::util::io::atomic_write;

pub const REPORT_FILE: &str = "report.json";
pub const SENSITIVITY_FILE: &str = "sensitivity.csv";
pub const TRAJECTORY_FILE: &str = "trajectory.csv";

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: Timestamp,
    pub sensitivity: SensitivityConfig,
    pub countries: Vec<CountryResult>,
    pub failures: Vec<CountryFailure>,
}

impl RunReport {
    pub fn new(sensitivity: SensitivityConfig, outcome: RunOutcome) -> Self {
        Self {
            generated_at: Timestamp::now(),
            sensitivity,
            countries: outcome.results,
            failures: outcome.failures,
        }
    }
}

#[derive(Serialize)]
struct SensitivityRow<'a> {
    country: &'a str,
    scenario: &'a str,
    years: u32,
    parameter: &'a str,
    s1: f64,
    s1_conf: f64,
    st: f64,
    st_conf: f64,
}

fn csv_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, StorageError> {
    writer
        .into_inner()
        .map_err(|e| StorageError::Serialize(format!("Failed to flush CSV: {}", e)))
}

pub fn sensitivity_csv(report: &RunReport) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in &report.countries {
        for scenario in &result.report.scenarios {
            for checkpoint in &scenario.checkpoints {
                for index in &checkpoint.indices {
                    writer
                        .serialize(SensitivityRow {
                            country: &result.report.country,
                            scenario: &scenario.scenario,
                            years: checkpoint.years,
                            parameter: &index.parameter,
                            s1: index.s1,
                            s1_conf: index.s1_conf,
                            st: index.st,
                            st_conf: index.st_conf,
                        })
                        .map_err(|e| {
                            StorageError::Serialize(format!("Failed to write CSV row: {}", e))
                        })?;
                }
            }
        }
    }
    csv_bytes(writer)
}

/// `None` when no country recorded a trajectory
pub fn trajectory_csv(report: &RunReport) -> Result<Option<Vec<u8>>, StorageError> {
    if report.countries.iter().all(|c| c.report.trajectory.is_empty()) {
        return Ok(None);
    }

    let row_error = |e: csv::Error| StorageError::Serialize(format!("Failed to write CSV row: {}", e));
    let mut writer = csv::Writer::from_writer(Vec::new());
    let header = ["country", "year", "sex"].into_iter().chain(BRACKET_LABELS);
    writer.write_record(header).map_err(row_error)?;

    let period_years = i32::try_from(report.sensitivity.period_years).unwrap_or(i32::MAX);
    for result in &report.countries {
        for (period, state) in result.report.trajectory.iter().enumerate() {
            let year = result.base_year + (period as i32 + 1) * period_years;
            for sex in Sex::ALL {
                let mut record = vec![
                    result.report.country.clone(),
                    year.to_string(),
                    sex.as_str().to_string(),
                ];
                record.extend(state.get(sex).iter().map(f64::to_string));
                writer.write_record(&record).map_err(row_error)?;
            }
        }
    }
    csv_bytes(writer).map(Some)
}

/// Write every report file into `dir`, returning the paths written
pub fn write_reports(dir: &Path, report: &RunReport) -> Result<Vec<PathBuf>, StorageError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        StorageError::Io(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let json = serde_json::to_vec_pretty(report)
        .map_err(|e| StorageError::Serialize(format!("Failed to serialize report: {}", e)))?;

    let mut files = vec![
        (dir.join(REPORT_FILE), json),
        (dir.join(SENSITIVITY_FILE), sensitivity_csv(report)?),
    ];
    if let Some(trajectory) = trajectory_csv(report)? {
        files.push((dir.join(TRAJECTORY_FILE), trajectory));
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        atomic_write(&path, &content).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "report written");
        written.push(path);
    }
    Ok(written)
}
