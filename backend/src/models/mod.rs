//! Domain models for the storemap pipeline.
//!
//! - [`Table`] - ordered rows sharing a set of canonical columns
//! - [`Record`] - a row type that can be built from projected CSV cells
//! - [`ColumnSelection`] - which source columns to load and what to call them
//! - [`Centroid`] / [`CategoryCount`] - aggregate outputs
//!
//! Concrete row types live in [`records`].

pub mod records;

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{LoadError, RowError};

pub use records::{ClusterColumn, ClusterRecord, StoreColumn, StoreRecord};

/// Cell texts read as null, matching the markers common CSV exports use.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null", "#N/A"];

// =============================================================================
// Column Selection
// =============================================================================

/// One requested column: source position and canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnSpec {
    pub index: usize,
    pub name: String,
}

/// Ordered list of `(source index -> canonical name)` mappings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ColumnSelection {
    specs: Vec<ColumnSpec>,
}

impl ColumnSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; builder style.
    pub fn column(mut self, index: usize, name: impl Into<String>) -> Self {
        self.specs.push(ColumnSpec {
            index,
            name: name.into(),
        });
        self
    }

    /// Replace the index of `name`, or append it if not selected yet.
    pub fn set(&mut self, name: &str, index: usize) {
        match self.specs.iter_mut().find(|s| s.name == name) {
            Some(spec) => spec.index = index,
            None => self.specs.push(ColumnSpec {
                index,
                name: name.to_string(),
            }),
        }
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    /// Canonical names in selection order.
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|s| s.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|s| s.name == name)
    }

    /// Check the selection against a record type's required columns.
    pub fn check_required(&self, required: &[&str]) -> Result<(), LoadError> {
        for (i, spec) in self.specs.iter().enumerate() {
            if self.specs[..i].iter().any(|s| s.name == spec.name) {
                return Err(LoadError::DuplicateColumn(spec.name.clone()));
            }
        }
        match required.iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(LoadError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Row Cells
// =============================================================================

/// Cells of one source row, projected onto the selected columns.
///
/// `cells[i]` belongs to `names[i]`; a missing trailing cell is null.
#[derive(Debug, Clone, Copy)]
pub struct RowCells<'a> {
    line: usize,
    names: &'a [String],
    cells: &'a [String],
}

impl<'a> RowCells<'a> {
    pub fn new(line: usize, names: &'a [String], cells: &'a [String]) -> Self {
        Self { line, names, cells }
    }

    /// Source line number (the header is line 1).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Non-null text of a column, exactly as read. Unselected columns read
    /// as null; surrounding whitespace is ignored only for the null check.
    pub fn text(&self, name: &str) -> Option<&'a str> {
        let idx = self.names.iter().position(|n| n == name)?;
        let raw = self.cells.get(idx)?.as_str();
        if NULL_MARKERS.contains(&raw.trim()) {
            None
        } else {
            Some(raw)
        }
    }

    pub fn owned_text(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }

    /// Parse a float column; null stays `None`.
    pub fn float(&self, name: &str) -> Result<Option<f64>, RowError> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
                RowError::new(self.line, "not a number")
                    .with_column(name)
                    .with_value(raw)
            }),
        }
    }

    /// Parse an integer column. Integral floats such as `1.0` are accepted
    /// when they fit in `i64`.
    pub fn integer(&self, name: &str) -> Result<Option<i64>, RowError> {
        let Some(raw) = self.text(name) else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Some(v));
        }
        // i64::MAX as f64 is 2^63, one past the largest i64.
        match trimmed.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(Some(f as i64))
            }
            _ => Err(RowError::new(self.line, "not an integer")
                .with_column(name)
                .with_value(raw)),
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// A typed row of a [`Table`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Typed column identifier.
    type Column: Copy + Eq + fmt::Display + FromStr + Send + Sync + 'static;

    /// Canonical names that must be part of any selection.
    const REQUIRED: &'static [&'static str];

    /// Build a record. `Ok(None)` excludes the row (e.g. null state).
    fn from_row(row: &RowCells<'_>) -> Result<Option<Self>, RowError>;

    fn longitude(&self) -> Option<f64>;

    fn latitude(&self) -> Option<f64>;

    /// Value of a column as text; numeric columns are formatted.
    fn value(&self, column: Self::Column) -> Option<Cow<'_, str>>;

    /// Both coordinates, when present.
    fn position(&self) -> Option<(f64, f64)> {
        Some((self.longitude()?, self.latitude()?))
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered rows sharing a schema.
///
/// Tables are immutable once built; filters return new tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<R> {
    columns: Vec<String>,
    rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(columns: Vec<String>, rows: Vec<R>) -> Self {
        Self { columns, rows }
    }

    /// Canonical column names, in load order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A new table with this table's columns and the given rows.
    pub fn derive(&self, rows: Vec<R>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

impl<R: Clone> Table<R> {
    /// Rows kept by `keep`, in order, as a new table.
    pub fn select<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&R) -> bool,
    {
        self.derive(self.rows.iter().filter(|r| keep(r)).cloned().collect())
    }
}

// =============================================================================
// Aggregate outputs
// =============================================================================

/// Mean longitude/latitude of a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub longitude: f64,
    pub latitude: f64,
}

/// Row count of one category value. `None` groups rows with a null value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: usize,
}

/// Output order of grouped counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountOrder {
    /// Sorted by category, null group first.
    #[default]
    Lexical,
    /// Order of first occurrence in the input.
    FirstSeen,
}

// =============================================================================
// Tests
// =============================================================================
