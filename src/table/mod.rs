//! The persisted documentation table.
//!
//! One [`Row`] per video, keyed by the `URL` column. Rows have heterogeneous
//! shapes: the table's column set is the union of every row's columns and a
//! column missing from a row is simply null.

pub mod columns;
mod reconcile;

pub use reconcile::{plan_video, reconcile, VideoPlan};

use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// A single scalar value stored in a table cell.
///
/// Fields read from CSV are always text so a load/save cycle writes them
/// back byte for byte. `Integer` is only produced by the pipeline itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
}

impl Cell {
    /// Parse a raw CSV field. Empty fields are null.
    pub fn parse(raw: &str) -> Option<Cell> {
        if raw.is_empty() {
            return None;
        }
        Some(Cell::Text(raw.to_string()))
    }

    /// The string value, if this cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for empty text.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(s) if s.is_empty())
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Integer(i)
    }
}

impl From<usize> for Cell {
    fn from(i: usize) -> Self {
        Cell::Integer(i as i64)
    }
}

/// One video's accumulated state: column name to value.
///
/// Column insertion order is remembered so that freshly added columns land
/// in a predictable position when the table is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    order: Vec<String>,
    cells: HashMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a column, if present and non-null.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Get a column as text. Non-text cells yield `None`.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Cell::as_text)
    }

    /// True when the column holds a non-empty value.
    pub fn has_value(&self, column: &str) -> bool {
        self.get(column).is_some_and(|c| !c.is_empty())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Set a column's value, remembering the column if it is new.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Cell>) {
        let column = column.into();
        if !self.cells.contains_key(&column) {
            self.order.push(column.clone());
        }
        self.cells.insert(column, value.into());
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The identity key of the row.
    pub fn url(&self) -> Option<&str> {
        self.text(columns::URL)
    }
}

/// An ordered sequence of rows with a union column set.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, collecting the union of their columns in
    /// order of first appearance.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::from_parts(Vec::new(), rows)
    }

    /// Build a table with a leading column order, extended by any columns the
    /// rows carry that are not listed yet.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Self { columns, rows };
        table.union_columns();
        table
    }

    fn union_columns(&mut self) {
        let mut seen: HashSet<String> = self.columns.iter().cloned().collect();
        for row in &self.rows {
            for column in row.columns() {
                if seen.insert(column.to_string()) {
                    self.columns.push(column.to_string());
                }
            }
        }
    }

    /// Pick up columns added to rows through [`Table::rows_mut`].
    pub fn sync_columns(&mut self) {
        self.union_columns();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Find the row for a video URL.
    pub fn find_by_url(&self, url: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.url() == Some(url))
    }

    /// Fill a column from per-row values, only where the row has no value yet.
    ///
    /// `values` is positional; extra or missing entries are ignored.
    pub fn fill_missing(&mut self, column: &str, values: Vec<Option<String>>) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.get(column).is_some() {
                continue;
            }
            if let Some(v) = value {
                row.set(column, v);
            }
        }
    }

    /// Sort rows by publish date, newest first. Rows without a publish date
    /// sort last; ties keep their relative order.
    pub fn sort_by_published(&mut self) {
        let key = columns::PUBLISHED;
        self.rows.sort_by(|a, b| match (a.get(key), b.get(key)) {
            (Some(x), Some(y)) => y.to_string().cmp(&x.to_string()),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    /// Read a table from CSV (header row of column names).
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();

        for record in rdr.records() {
            let record = record?;
            let mut row = Row::new();
            for (column, raw) in columns.iter().zip(record.iter()) {
                if let Some(cell) = Cell::parse(raw) {
                    row.set(column.clone(), cell);
                }
            }
            rows.push(row);
        }

        debug!("Read table with {} columns and {} rows", columns.len(), rows.len());
        Ok(Self::from_parts(columns, rows))
    }

    /// Load a table from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read_csv(file)
    }

    /// Write the table as CSV. Null cells are written as empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}
