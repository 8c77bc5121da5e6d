use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use popsens_core::DataError;
use popsens_core::model::{AGE_BRACKETS, BRACKET_LABELS, CohortState, Sex};

use super::StorageError;

const LEADING_COLUMNS: [&str; 3] = ["country", "sex", "year"];

#[derive(Debug, Clone, Default)]
struct YearRows {
    female: Option<Vec<f64>>,
    male: Option<Vec<f64>>,
}

impl YearRows {
    fn slot(&mut self, sex: Sex) -> &mut Option<Vec<f64>> {
        match sex {
            Sex::Female => &mut self.female,
            Sex::Male => &mut self.male,
        }
    }

    fn state(&self, country: &str, year: i32) -> Result<CohortState, DataError> {
        let missing = |sex: Sex| DataError::MissingRows(format!("{country} {year}: no {sex} row"));
        let female = self.female.as_ref().ok_or_else(|| missing(Sex::Female))?;
        let male = self.male.as_ref().ok_or_else(|| missing(Sex::Male))?;
        CohortState::new(female, male)
    }
}

/// The two most recent pyramids of one country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPyramids {
    pub previous_year: i32,
    pub previous: CohortState,
    pub year: i32,
    pub current: CohortState,
}

#[derive(Debug, Clone, Default)]
struct CountryRows {
    years: BTreeMap<i32, YearRows>,
    /// First unreadable row of this country
    malformed: Option<DataError>,
}

/// Population table in long form: `country,sex,year,0-4,…,100+`.
///
/// Countries iterate in name order so reports are deterministic. A row that
/// cannot be read only poisons its own country: the table still loads and the
/// error is returned when that country is requested.
#[derive(Debug, Clone, Default)]
pub struct PopulationTable {
    countries: BTreeMap<String, CountryRows>,
}

impl PopulationTable {
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
        validate_headers(headers)?;

        let mut table = Self::default();
        for (index, record) in rows.records().enumerate() {
            // header is line 1
            let line = index + 2;
            let record =
                record.map_err(|e| StorageError::Parse(format!("Line {}: {}", line, e)))?;
            table.insert(&record, line);
        }

        tracing::debug!(countries = table.countries.len(), "population table loaded");
        Ok(table)
    }

    fn insert(&mut self, record: &csv::StringRecord, line: usize) {
        let country = record.get(0).unwrap_or_default();
        let entry = self.countries.entry(country.to_string()).or_default();

        let result = parse_row(record, line).and_then(|(sex, year, counts)| {
            let slot = entry.years.entry(year).or_default().slot(sex);
            if slot.is_some() {
                return Err(DataError::MalformedRow {
                    line,
                    reason: format!("duplicate {sex} row for {year}"),
                });
            }
            *slot = Some(counts);
            Ok(())
        });

        if let Err(error) = result {
            tracing::warn!(country, error = %error, "unreadable population row");
            entry.malformed.get_or_insert(error);
        }
    }

    /// Country names in table order
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, country: &str) -> bool {
        self.countries.contains_key(country)
    }

    fn years(&self, country: &str) -> Result<&BTreeMap<i32, YearRows>, DataError> {
        let rows = self
            .countries
            .get(country)
            .ok_or_else(|| DataError::MissingRows(format!("no population rows for {country}")))?;
        match &rows.malformed {
            Some(error) => Err(error.clone()),
            None => Ok(&rows.years),
        }
    }

    /// The two most recent years of `country` as `(previous, current)`
    pub fn latest_pair(&self, country: &str) -> Result<CountryPyramids, DataError> {
        let years = self.years(country)?;
        let mut recent = years.iter().rev();
        match (recent.next(), recent.next()) {
            (Some((&year, current)), Some((&previous_year, previous))) => Ok(CountryPyramids {
                previous_year,
                previous: previous.state(country, previous_year)?,
                year,
                current: current.state(country, year)?,
            }),
            _ => Err(DataError::MissingRows(format!(
                "{country}: two census years required, found {}",
                years.len()
            ))),
        }
    }

    /// Every year of `country` in ascending order
    pub fn series(&self, country: &str) -> Result<Vec<CohortState>, DataError> {
        let years = self.years(country)?;
        let female = years.values().filter(|y| y.female.is_some()).count();
        let male = years.values().filter(|y| y.male.is_some()).count();
        if female != male {
            return Err(DataError::SeriesLengthMismatch { female, male });
        }
        years
            .iter()
            .map(|(&year, rows)| rows.state(country, year))
            .collect()
    }
}

fn parse_row(record: &csv::StringRecord, line: usize) -> Result<(Sex, i32, Vec<f64>), DataError> {
    let malformed = |reason: String| DataError::MalformedRow { line, reason };

    let expected = LEADING_COLUMNS.len() + AGE_BRACKETS;
    if record.len() != expected {
        return Err(malformed(format!(
            "{} fields, expected {}",
            record.len(),
            expected
        )));
    }

    let sex_label = record.get(1).unwrap_or_default();
    let sex = Sex::parse(sex_label).ok_or_else(|| malformed(format!("unknown sex '{sex_label}'")))?;
    let year_label = record.get(2).unwrap_or_default();
    let year: i32 = year_label
        .parse()
        .map_err(|_| malformed(format!("invalid year '{year_label}'")))?;

    let counts = record
        .iter()
        .skip(LEADING_COLUMNS.len())
        .zip(BRACKET_LABELS)
        .map(|(cell, label)| {
            cell.parse::<f64>()
                .map_err(|_| malformed(format!("invalid count '{cell}' for {label}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((sex, year, counts))
}

fn validate_headers(headers: &csv::StringRecord) -> Result<(), StorageError> {
    let expected = LEADING_COLUMNS.len() + AGE_BRACKETS;
    if headers.len() != expected {
        return Err(StorageError::Parse(format!(
            "Population table has {} columns, expected {}",
            headers.len(),
            expected
        )));
    }

    let names = LEADING_COLUMNS.iter().chain(BRACKET_LABELS.iter());
    for (found, name) in headers.iter().zip(names) {
        if !found.eq_ignore_ascii_case(name) {
            return Err(StorageError::Parse(format!(
                "Unexpected column '{}', expected '{}'",
                found, name
            )));
        }
    }
    Ok(())
}
