//! Intermediate and Aligned Feature Tables

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One row of the intermediate table: column name to numeric value
pub type FeatureRow = BTreeMap<String, f64>;

/// Rows produced by normalize -> derive -> encode, before alignment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `rows` rows
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            rows: Vec::with_capacity(rows),
        }
    }

    /// Append a row
    pub fn push(&mut self, row: FeatureRow) {
        self.rows.push(row);
    }

    /// Rows in insertion order
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of the columns present in any row
    pub fn columns(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect()
    }
}

/// Model-ready table: exactly the reference columns, in reference order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedTable {
    columns: &'static [&'static str],
    /// Row-major values, `columns.len()` per row
    values: Vec<f64>,
}

impl AlignedTable {
    /// Build from row-major values
    pub(crate) fn from_values(columns: &'static [&'static str], values: Vec<f64>) -> Self {
        debug_assert!(columns.is_empty() || values.len() % columns.len() == 0);
        Self { columns, values }
    }

    /// Column names in model order
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.values.len() / self.columns.len()
        }
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of one row
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let width = self.width();
        let start = index.checked_mul(width)?;
        self.values.get(start..start + width)
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.width().max(1))
    }

    /// Value of a named column in a row
    pub fn get(&self, index: usize, column: &str) -> Option<f64> {
        let position = self.columns.iter().position(|c| *c == column)?;
        self.row(index).map(|row| row[position])
    }

    /// All values, row-major
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
