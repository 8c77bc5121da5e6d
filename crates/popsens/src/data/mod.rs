//! Loading of population and range tables.
//!
//! File-level problems (unreadable files, malformed rows) are fatal for the
//! whole run and surface as [`StorageError`]. Problems that concern a single
//! country, such as missing sex/year rows, surface as
//! [`popsens_core::DataError`] when that country is requested.

mod population;
mod ranges;

pub use population::{CountryPyramids, PopulationTable};
pub use ranges::{RangesTable, parse_range};

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// Parse error (malformed CSV or YAML)
    Parse(String),
    /// Serialization error
    Serialize(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {}", msg),
            StorageError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}
