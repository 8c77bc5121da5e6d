//! Run configuration loaded from YAML.
//!
//! ```yaml
//! population: data/countries_for_prediction.csv
//! ranges: data/countries_ranges.csv
//! output_dir: out
//! sensitivity:
//!   sample_exponent: 11
//!   checkpoints: [1, 3, 9, 19]
//!   projection:
//!     accounting: legacy
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use popsens_core::SensitivityConfig;
use serde::{Deserialize, Serialize};

use crate::data::StorageError;

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_history_lag() -> usize {
    5
}

/// Where parameter ranges come from
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSource {
    /// Precomputed `"[low, high]"` table
    Table(PathBuf),
    /// Annual population history; ranges span its rates
    History { path: PathBuf, lag: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Population table with at least two census years per country
    #[serde(default)]
    pub population: Option<PathBuf>,
    /// Ranges table; mutually exclusive with `history`
    #[serde(default)]
    pub ranges: Option<PathBuf>,
    /// Annual population history used to derive ranges
    #[serde(default)]
    pub history: Option<PathBuf>,
    /// Years between the pyramids compared for historical survival rates
    #[serde(default = "default_history_lag")]
    pub history_lag: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Restrict the run to these countries; empty means all
    #[serde(default)]
    pub countries: Vec<String>,
    /// Also write `popsens.log` into the output directory
    #[serde(default)]
    pub log_to_file: bool,
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population: None,
            ranges: None,
            history: None,
            history_lag: default_history_lag(),
            output_dir: default_output_dir(),
            countries: Vec::new(),
            log_to_file: false,
            sensitivity: SensitivityConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, StorageError> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| StorageError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, StorageError> {
        serde_saphyr::to_string(self)
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize config: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = fs::read_to_string(path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn population_path(&self) -> Result<&Path, StorageError> {
        self.population
            .as_deref()
            .ok_or_else(|| StorageError::Parse("No population table configured".to_string()))
    }

    /// Exactly one of `ranges` and `history` must be set
    pub fn range_source(&self) -> Result<RangeSource, StorageError> {
        match (&self.ranges, &self.history) {
            (Some(path), None) => Ok(RangeSource::Table(path.clone())),
            (None, Some(path)) => Ok(RangeSource::History {
                path: path.clone(),
                lag: self.history_lag,
            }),
            (Some(_), Some(_)) => Err(StorageError::Parse(
                "Configure either ranges or history, not both".to_string(),
            )),
            (None, None) => Err(StorageError::Parse(
                "No ranges table or history configured".to_string(),
            )),
        }
    }

    /// Whether `country` is selected by the `countries` filter
    #[must_use]
    pub fn includes(&self, country: &str) -> bool {
        self.countries.is_empty() || self.countries.iter().any(|c| c == country)
    }
}
