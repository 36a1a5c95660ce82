//! CSV reader for a pair of aligned series.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

/// Errors from reading the input CSV.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The series file is missing or unreadable.
    #[error("cannot open series file {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A record could not be parsed as CSV.
    #[error("malformed CSV in {path} near byte {offset}")]
    CsvParse {
        /// Input file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a requested column is not in the header.
    #[error("column \"{name}\" not found in header of {path}")]
    MissingColumn {
        /// Input file.
        path: PathBuf,
        /// The requested column name.
        name: String,
    },

    /// Returned when no column is named and the header has fewer than two columns.
    #[error("{path} has {got} column(s), need at least 2")]
    TooFewColumns {
        /// Input file.
        path: PathBuf,
        /// Number of header columns.
        got: usize,
    },

    /// The header is present but no rows follow it.
    #[error("{path} has a header but no data rows")]
    EmptyDataset {
        /// Input file.
        path: PathBuf,
    },

    /// Returned when a data row is too short to hold a selected column.
    #[error("missing value in {path}: row {row_index}, column \"{column}\"")]
    MissingValue {
        /// Input file.
        path: PathBuf,
        /// Zero-based data row index.
        row_index: usize,
        /// Name of the column.
        column: String,
    },

    /// Returned when a cell is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    NonFiniteValue {
        /// Input file.
        path: PathBuf,
        /// Zero-based data row index.
        row_index: usize,
        /// Name of the column.
        column: String,
        /// The raw string value that failed to parse.
        raw: String,
    },
}

/// Two series read from the same file, row-aligned.
#[derive(Debug)]
pub struct SeriesPair {
    /// Header names of the two columns, in `(a, b)` order.
    pub columns: [String; 2],
    /// Values of the first column.
    pub a: Vec<f64>,
    /// Values of the second column.
    pub b: Vec<f64>,
}

/// Reads two numeric columns from a CSV file.
///
/// Expected CSV format:
/// - Header row required
/// - One row per time step
/// - Columns are selected by header name; by default the first two columns
///
/// Extra columns are ignored.
pub struct PairReader {
    path: PathBuf,
    column_a: Option<String>,
    column_b: Option<String>,
}

impl PairReader {
    /// Reader over `path`, selecting the first two columns.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            column_a: None,
            column_b: None,
        }
    }

    /// Select the columns by header name. `None` keeps the positional default.
    #[must_use]
    pub fn with_columns(mut self, column_a: Option<String>, column_b: Option<String>) -> Self {
        self.column_a = column_a;
        self.column_b = column_b;
        self
    }

    /// Read and validate the CSV file, returning a [`SeriesPair`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`InputError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`InputError::CsvParse`] | Malformed CSV record |
    /// | [`InputError::MissingColumn`] | A named column is not in the header |
    /// | [`InputError::TooFewColumns`] | Positional default with fewer than two columns |
    /// | [`InputError::EmptyDataset`] | Zero data rows after header |
    /// | [`InputError::MissingValue`] | Row too short for a selected column |
    /// | [`InputError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<SeriesPair, InputError> {
        let file = std::fs::File::open(&self.path).map_err(|e| InputError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets short rows reach our MissingValue check.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let idx_a = self.resolve(&header, self.column_a.as_deref(), 0)?;
        let idx_b = self.resolve(&header, self.column_b.as_deref(), 1)?;
        let columns = [header[idx_a].to_string(), header[idx_b].to_string()];
        debug!(column_a = %columns[0], column_b = %columns[1], "selected columns");

        let mut a = Vec::new();
        let mut b = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            a.push(self.parse_cell(&record, row_index, idx_a, &columns[0])?);
            b.push(self.parse_cell(&record, row_index, idx_b, &columns[1])?);
        }

        if a.is_empty() {
            return Err(InputError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n = a.len(), "series pair loaded");
        Ok(SeriesPair { columns, a, b })
    }

    fn resolve(
        &self,
        header: &csv::StringRecord,
        name: Option<&str>,
        fallback: usize,
    ) -> Result<usize, InputError> {
        match name {
            Some(name) => header.iter().position(|h| h == name).ok_or_else(|| {
                InputError::MissingColumn {
                    path: self.path.clone(),
                    name: name.to_string(),
                }
            }),
            None if header.len() >= 2 => Ok(fallback),
            None => Err(InputError::TooFewColumns {
                path: self.path.clone(),
                got: header.len(),
            }),
        }
    }

    fn parse_cell(
        &self,
        record: &csv::StringRecord,
        row_index: usize,
        col: usize,
        column: &str,
    ) -> Result<f64, InputError> {
        let raw = record.get(col).ok_or_else(|| InputError::MissingValue {
            path: self.path.clone(),
            row_index,
            column: column.to_string(),
        })?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(InputError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
                raw: raw.to_string(),
            }),
        }
    }

    fn csv_error(&self, e: csv::Error) -> InputError {
        InputError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
