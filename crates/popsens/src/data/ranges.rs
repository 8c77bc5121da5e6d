use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use popsens_core::{DataError, FixedBounds};
use popsens_core::model::ParameterId;

use super::StorageError;

/// Parse a `"[low, high]"` range cell
pub fn parse_range(cell: &str) -> Option<(f64, f64)> {
    let inner = cell.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (low, high) = inner.split_once(',')?;
    Some((low.trim().parse().ok()?, high.trim().parse().ok()?))
}

/// Precomputed parameter ranges per country.
///
/// One row per country; the first column is `country` and every other
/// column is a parameter name (`fertility`, `female_percentage`,
/// `25-29_female`, …) holding a `"[low, high]"` cell. Columns that do not
/// name a parameter are skipped. A row with an unreadable cell is kept as
/// the error of its country.
#[derive(Debug, Clone, Default)]
pub struct RangesTable {
    countries: BTreeMap<String, Result<FixedBounds, DataError>>,
}

impl RangesTable {
    pub fn from_path(path: &Path) -> Result<Self, StorageError> {
        let file = std::fs::File::open(path).map_err(|e| {
            StorageError::Io(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, StorageError> {
        let mut rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rows
            .headers()
            .map_err(|e| StorageError::Parse(format!("Failed to read header: {}", e)))?;
        if !headers
            .get(0)
            .is_some_and(|h| h.eq_ignore_ascii_case("country"))
        {
            return Err(StorageError::Parse(
                "Ranges table must start with a 'country' column".to_string(),
            ));
        }

        let columns: Vec<Option<ParameterId>> = headers
            .iter()
            .skip(1)
            .map(|name| match name.parse::<ParameterId>() {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(column = name, "skipping column: {e}");
                    None
                }
            })
            .collect();

        let mut table = Self::default();
        for (index, record) in rows.records().enumerate() {
            let line = index + 2;
            let record =
                record.map_err(|e| StorageError::Parse(format!("Line {}: {}", line, e)))?;
            let country = record.get(0).unwrap_or_default().to_string();

            let bounds = parse_bounds(&record, &columns, line);
            if let Err(error) = &bounds {
                tracing::warn!(country = %country, error = %error, "unreadable ranges row");
            }
            table.countries.insert(country, bounds);
        }

        tracing::debug!(countries = table.countries.len(), "ranges table loaded");
        Ok(table)
    }

    /// Ranges of `country`, or why they are unavailable
    pub fn get(&self, country: &str) -> Result<&FixedBounds, DataError> {
        match self.countries.get(country) {
            Some(Ok(bounds)) => Ok(bounds),
            Some(Err(error)) => Err(error.clone()),
            None => Err(DataError::MissingRows(format!("no ranges for {country}"))),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

fn parse_bounds(
    record: &csv::StringRecord,
    columns: &[Option<ParameterId>],
    line: usize,
) -> Result<FixedBounds, DataError> {
    if record.len() != columns.len() + 1 {
        return Err(DataError::MalformedRow {
            line,
            reason: format!("{} fields, expected {}", record.len(), columns.len() + 1),
        });
    }

    let mut bounds = FixedBounds::new();
    for (cell, id) in record.iter().skip(1).zip(columns) {
        let Some(id) = id else { continue };
        let (low, high) = parse_range(cell).ok_or_else(|| DataError::MalformedRow {
            line,
            reason: format!("invalid range '{cell}' for {id}"),
        })?;
        bounds.insert(*id, low, high);
    }
    Ok(bounds)
}
