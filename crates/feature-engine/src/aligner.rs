//! Feature Alignment
//!
//! Reindexes the intermediate table to the model's reference columns. Missing
//! columns are zero-filled and unknown columns dropped; neither raises. Every
//! zero-fill is counted in `feature_aligner_filled_columns_total` so drift shows
//! up in production metrics instead of only in wrong predictions.

use std::collections::BTreeSet;

use metrics::counter;
use tracing::debug;

use crate::reference::FeatureReference;
use crate::table::{AlignedTable, FeatureTable};

/// What alignment had to reconcile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Reference columns zero-filled in at least one row
    pub filled: Vec<&'static str>,
    /// Intermediate columns not in the reference
    pub dropped: Vec<String>,
}

impl AlignmentReport {
    /// Whether the intermediate table matched the reference exactly
    pub fn is_exact(&self) -> bool {
        self.filled.is_empty() && self.dropped.is_empty()
    }
}

/// Aligns intermediate tables to one feature reference
#[derive(Debug, Clone, Copy)]
pub struct FeatureAligner {
    reference: &'static FeatureReference,
}

impl FeatureAligner {
    /// Create an aligner for a reference
    pub fn new(reference: &'static FeatureReference) -> Self {
        Self { reference }
    }

    /// Reference in use
    pub fn reference(&self) -> &'static FeatureReference {
        self.reference
    }

    /// Produce the model-ready table
    pub fn align(&self, table: &FeatureTable) -> (AlignedTable, AlignmentReport) {
        let columns = self.reference.columns();
        let mut values = Vec::with_capacity(table.len() * columns.len());
        let mut filled_set = BTreeSet::new();

        for row in table.rows() {
            for column in columns {
                match row.get(*column) {
                    Some(value) => values.push(*value),
                    None => {
                        filled_set.insert(*column);
                        values.push(0.0);
                    }
                }
            }
        }

        let dropped: Vec<String> = table
            .columns()
            .into_iter()
            .filter(|column| !self.reference.contains(column))
            .collect();

        let vehicle = self.reference.vehicle().as_str();
        let filled: Vec<&'static str> = columns.iter().copied().filter(|c| filled_set.contains(c)).collect();
        for column in &filled {
            counter!("feature_aligner_filled_columns_total", "vehicle" => vehicle, "column" => *column)
                .increment(1);
        }
        if !dropped.is_empty() {
            counter!("feature_aligner_dropped_columns_total", "vehicle" => vehicle)
                .increment(dropped.len() as u64);
        }
        if !filled.is_empty() || !dropped.is_empty() {
            debug!(
                "[{}] Alignment zero-filled {:?}, dropped {:?} over {} row(s)",
                vehicle,
                filled,
                dropped,
                table.len()
            );
        }

        (
            AlignedTable::from_values(columns, values),
            AlignmentReport { filled, dropped },
        )
    }
}
