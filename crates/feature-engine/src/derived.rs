//! Derived Feature Calculation
//!
//! Class-specific engineered columns. Every source column is read through
//! [`value`], so an absent source reads as 0.0 and derivation never fails.

use data_validator::{NormalizedCategories, RawRecord};

use crate::table::FeatureRow;

/// Computes the derived columns of one row in place
pub type DeriveFn = fn(&mut FeatureRow, &NormalizedCategories);

/// Columns written by [`derive_ev`]
pub const EV_DERIVED: &[&str] = &["battery_per_kWh", "battery_remaining_kWh", "eco_mode_flag"];

/// Columns written by [`derive_hv`]
pub const HV_DERIVED: &[&str] = &[
    "speed_sq",
    "abs_slope",
    "hydrogen_per_year",
    "age_squared",
    "h2_x_efficiency",
    "h2_x_age",
];

/// Copy every non-categorical raw field into the row as a float
pub fn pass_through(record: &RawRecord, categorical: &[&str], row: &mut FeatureRow) {
    for (name, scalar) in record.iter() {
        if !categorical.contains(&name) {
            row.insert(name.to_string(), scalar.to_f64());
        }
    }
}

/// Synthesize required numeric columns that are absent as 0.0
pub fn ensure_numeric(columns: &[&str], row: &mut FeatureRow) {
    for column in columns {
        row.entry(column.to_string()).or_insert(0.0);
    }
}

fn value(row: &FeatureRow, column: &str) -> f64 {
    row.get(column).copied().unwrap_or(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Battery ratios and the eco flag
pub fn derive_ev(row: &mut FeatureRow, categories: &NormalizedCategories) {
    let percentage = value(row, "battery_percentage");
    let capacity = value(row, "battery_capacity_kwh");

    let per_kwh = if capacity == 0.0 {
        0.0
    } else {
        finite_or_zero(percentage / capacity)
    };
    let remaining = finite_or_zero(capacity * percentage / 100.0);
    let eco = if categories.driving_mode == "Eco" { 1.0 } else { 0.0 };

    row.insert("battery_per_kWh".to_string(), per_kwh);
    row.insert("battery_remaining_kWh".to_string(), remaining);
    row.insert("eco_mode_flag".to_string(), eco);
}

/// Speed, slope and fuel-cell cross terms.
///
/// `speed_sq` and `abs_slope` are always recomputed. The remaining columns
/// keep a value already supplied upstream; `hydrogen_per_year` has no formula
/// and is 0.0 unless supplied.
pub fn derive_hv(row: &mut FeatureRow, _categories: &NormalizedCategories) {
    let speed = value(row, "speed_avg_kmph");
    let slope = value(row, "terrain_slope");
    let hydrogen = value(row, "hydrogen_percentage");
    let age = value(row, "fuel_cell_age_years");
    let efficiency = value(row, "fuel_cell_efficiency");

    row.insert("speed_sq".to_string(), finite_or_zero(speed * speed));
    row.insert("abs_slope".to_string(), slope.abs());

    let upstream_or = |row: &mut FeatureRow, column: &str, computed: f64| {
        row.entry(column.to_string()).or_insert(finite_or_zero(computed));
    };
    upstream_or(row, "hydrogen_per_year", 0.0);
    upstream_or(row, "age_squared", age * age);
    upstream_or(row, "h2_x_efficiency", hydrogen * efficiency);
    upstream_or(row, "h2_x_age", hydrogen * age);
}
