//! Backlog loading and flattening
//!
//! A backlog is whatever CSV the user hands us: a header row and any number of
//! rows. Nothing about the columns is assumed.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Errors from reading a backlog file
#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("Failed to open backlog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid backlog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Backlog is empty: no header row found")]
    Empty,
}

/// A parsed backlog table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backlog {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Backlog {
    /// Build a backlog from already-split cells
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV from any reader
    ///
    /// The first record is the header row. Rows with a different field count
    /// than the header are rejected.
    pub fn parse<R: Read>(reader: R) -> Result<Self, BacklogError> {
        debug!("Backlog::parse: called");
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            debug!("Backlog::parse: no header row");
            return Err(BacklogError::Empty);
        }

        let rows = csv_reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(columns = headers.len(), rows = rows.len(), "Backlog::parse: parsed");
        Ok(Self { headers, rows })
    }

    /// Read and parse a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BacklogError> {
        let path = path.as_ref();
        debug!(?path, "Backlog::load: called");
        let file = File::open(path).map_err(|source| BacklogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let backlog = Self::parse(file)?;
        info!("Loaded backlog from {} ({} rows)", path.display(), backlog.len());
        Ok(backlog)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One line per row, cells joined with `", "`; headers are not included
    pub fn format_as_text(&self) -> String {
        self.rows.iter().map(|row| row.join(", ")).collect::<Vec<_>>().join("\n")
    }

    /// Aligned text table with headers, for display
    pub fn render_table(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0usize; columns];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let format_row = |row: &[String]| {
            widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", cell, width = *width)
                })
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.headers));
        lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
        lines.extend(self.rows.iter().map(|row| format_row(row)));
        lines.join("\n")
    }
}

/// Flatten a backlog into prompt text
pub fn format_backlog_as_text(backlog: &Backlog) -> String {
    backlog.format_as_text()
}
