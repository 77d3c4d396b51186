//! Delimited GTFS table reading.
//!
//! Tables are returned as ordered rows of raw strings keyed by header name.
//! Interpreting those strings is left to [`crate::gtfs::records`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::models::types::{Result, TransitError};

/// The six tables the compiler joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GtfsTable {
    Routes,
    Trips,
    Shapes,
    Stops,
    StopTimes,
    Frequencies,
}

impl GtfsTable {
    pub const ALL: [GtfsTable; 6] = [
        Self::Routes,
        Self::Trips,
        Self::Shapes,
        Self::Stops,
        Self::StopTimes,
        Self::Frequencies,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Routes => "routes",
            Self::Trips => "trips",
            Self::Shapes => "shapes",
            Self::Stops => "stops",
            Self::StopTimes => "stop_times",
            Self::Frequencies => "frequencies",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.txt", self.name())
    }
}

/// Find the GTFS directory among the entries of `working_dir`.
///
/// A directory matches when its name contains `pattern`, ignoring case. When
/// several match, the lexicographically smallest name wins.
pub fn locate_source(working_dir: &Path, pattern: &str) -> Result<PathBuf> {
    let entries = fs::read_dir(working_dir).map_err(|source| TransitError::Io {
        path: working_dir.to_path_buf(),
        source,
    })?;

    let needle = pattern.to_lowercase();
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| TransitError::MissingSource {
            pattern: pattern.to_string(),
            searched: working_dir.to_path_buf(),
        })
}

/// A parsed table: shared header index plus raw records in file order.
#[derive(Debug, Clone)]
pub struct Table {
    table: GtfsTable,
    columns: Arc<HashMap<String, usize>>,
    records: Vec<StringRecord>,
}

/// One row of a [`Table`], viewed as column name → raw string.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
    index: usize,
}

impl<'a> Row<'a> {
    /// Raw value of `column`, or `""` when the column or field is absent.
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .unwrap_or("")
    }

    /// Value of `column` when present and non-blank.
    pub fn non_empty(&self, column: &str) -> Option<&'a str> {
        Some(self.get(column)).filter(|v| !v.is_empty())
    }

    /// Zero-based data row index (the header is not counted).
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Table {
    pub fn kind(&self) -> GtfsTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().enumerate().map(move |(index, record)| Row {
            columns: &self.columns,
            record,
            index,
        })
    }

    /// Parse table content that has already been read into memory.
    pub fn from_reader(table: GtfsTable, reader: impl std::io::Read) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let to_table_error = |source: csv::Error| TransitError::Table {
            table: table.name().to_string(),
            source,
        };

        let columns: HashMap<String, usize> = csv_reader
            .headers()
            .map_err(to_table_error)?
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').to_string(), i))
            .collect();

        let mut records = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(to_table_error)?;
            // Blank lines, including trailing ones
            if record.iter().all(str::is_empty) {
                continue;
            }
            records.push(record);
        }

        Ok(Self {
            table,
            columns: Arc::new(columns),
            records,
        })
    }
}

/// Read `<dir>/<table>.txt`.
pub fn read_table(dir: &Path, table: GtfsTable) -> Result<Table> {
    let path = dir.join(table.file_name());
    if !path.is_file() {
        return Err(TransitError::MissingTable {
            table: table.name().to_string(),
            directory: dir.to_path_buf(),
        });
    }

    let file = fs::File::open(&path).map_err(|source| TransitError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed = Table::from_reader(table, std::io::BufReader::new(file))?;
    tracing::debug!("read {} rows from {}", parsed.len(), path.display());
    Ok(parsed)
}
